use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Method, Response, Url};
use serde::de::DeserializeOwned;
use thiserror::Error;

use bantin_api_types::ErrorBody;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server rejected the request (status {status}): {message}")]
    Server { status: u16, message: String },
    #[error("failed to parse response body: {0}")]
    Decode(String),
}

impl ApiError {
    /// Message suitable for a user-facing notice: the server's own message
    /// when one was extracted, a terse transport description otherwise.
    pub fn notice_message(&self) -> String {
        match self {
            Self::Server { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Thin request layer over `reqwest`: URL joining, query encoding, optional
/// bearer authorization, and server-error extraction. Cloning is cheap; the
/// underlying connection pool is shared.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base: Url,
}

impl ApiClient {
    pub fn new(site: &str, timeout: Duration) -> Result<Self, ApiError> {
        // A trailing slash keeps relative joins under the configured path
        // instead of replacing its last segment.
        let site = site.trim_end_matches('/');
        let base = Url::parse(&format!("{site}/"))?;
        let client = Client::builder()
            .user_agent(Self::user_agent())
            .timeout(timeout)
            .build()?;
        Ok(Self { client, base })
    }

    pub fn user_agent() -> &'static str {
        concat!("bantin/", env!("CARGO_PKG_VERSION"))
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    fn url(&self, path: &str, query: Option<&[(&str, String)]>) -> Result<Url, ApiError> {
        let mut url = self.base.join(path)?;
        if let Some(pairs) = query {
            url.set_query(None);
            let mut qp = url.query_pairs_mut();
            for (key, value) in pairs {
                qp.append_pair(key, value);
            }
        }
        Ok(url)
    }

    /// Issue a request and decode the JSON response body.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: Option<&[(&str, String)]>,
        body: Option<&serde_json::Value>,
        bearer: Option<&str>,
    ) -> Result<T, ApiError> {
        let resp = self.send(method, path, query, body, bearer).await?;
        Self::handle(resp).await
    }

    /// Issue a request and discard any successful response body.
    pub async fn request_unit(
        &self,
        method: Method,
        path: &str,
        query: Option<&[(&str, String)]>,
        body: Option<&serde_json::Value>,
        bearer: Option<&str>,
    ) -> Result<(), ApiError> {
        let resp = self.send(method, path, query, body, bearer).await?;
        let status = resp.status();
        if !status.is_success() {
            let bytes = resp.bytes().await.unwrap_or_default();
            return Err(Self::server_error(status.as_u16(), &bytes));
        }
        Ok(())
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        query: Option<&[(&str, String)]>,
        body: Option<&serde_json::Value>,
        bearer: Option<&str>,
    ) -> Result<Response, ApiError> {
        let url = self.url(path, query)?;
        let mut req = self.client.request(method, url);
        if let Some(token) = bearer {
            req = req.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(body) = body {
            req = req.json(body);
        }
        Ok(req.send().await?)
    }

    async fn handle<T: DeserializeOwned>(resp: Response) -> Result<T, ApiError> {
        let status = resp.status();
        let bytes = resp.bytes().await?;
        if !status.is_success() {
            return Err(Self::server_error(status.as_u16(), &bytes));
        }
        serde_json::from_slice(&bytes).map_err(|err| ApiError::Decode(err.to_string()))
    }

    /// Prefer the body's `message` field; fall back to the raw body when it
    /// is short enough to be one, else to the bare status.
    fn server_error(status: u16, bytes: &[u8]) -> ApiError {
        let extracted = serde_json::from_slice::<ErrorBody>(bytes)
            .ok()
            .and_then(|body| body.message);
        let message = match extracted {
            Some(message) => message,
            None => {
                let text = String::from_utf8_lossy(bytes);
                let text = text.trim();
                if text.is_empty() || text.len() > 200 {
                    format!("status {status}")
                } else {
                    text.to_string()
                }
            }
        };
        ApiError::Server { status, message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_error_prefers_body_message() {
        let err = ApiClient::server_error(422, r#"{"message":"Slug đã tồn tại"}"#.as_bytes());
        match err {
            ApiError::Server { status, message } => {
                assert_eq!(status, 422);
                assert_eq!(message, "Slug đã tồn tại");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn server_error_falls_back_to_status() {
        let err = ApiClient::server_error(500, b"");
        assert_eq!(err.notice_message(), "status 500");
    }

    #[test]
    fn relative_paths_join_under_the_base() {
        let client = ApiClient::new("http://localhost:3000/mock_api", Duration::from_secs(5))
            .expect("client");
        let url = client.url("categories/7", None).expect("url");
        assert_eq!(url.as_str(), "http://localhost:3000/mock_api/categories/7");
    }
}
