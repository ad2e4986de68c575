//! Configuration layer: typed settings with layered precedence (file → env).

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;

use crate::cache::CacheConfig;
use crate::domain::types::Locale;

const LOCAL_CONFIG_BASENAME: &str = "bantin";
const ENV_PREFIX: &str = "BANTIN";
const DEFAULT_SITE_URL: &str = "http://localhost:3000/mock_api";
const DEFAULT_STATE_DIR: &str = ".bantin";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("site URL must not be empty")]
    EmptySiteUrl,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Compact,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default directive when `RUST_LOG` is unset, e.g. `info` or `bantin=debug`.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            format: LogFormat::Compact,
        }
    }
}

/// Application settings: defaults, overridden by `bantin.toml`, overridden
/// by `BANTIN_*` environment variables (`BANTIN_SITE_URL`,
/// `BANTIN_CACHE__POST_LIMIT`, …).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the content API.
    pub site_url: String,
    /// Directory holding durable client state (the session file).
    pub state_dir: PathBuf,
    pub request_timeout_secs: u64,
    /// Locale used before a preference is stored in the session.
    pub locale: Locale,
    pub logging: LoggingSettings,
    pub cache: CacheConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            site_url: DEFAULT_SITE_URL.to_string(),
            state_dir: PathBuf::from(DEFAULT_STATE_DIR),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            locale: Locale::default(),
            logging: LoggingSettings::default(),
            cache: CacheConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load settings with layered precedence. `config_file` is an explicit
    /// path that must exist; the local `bantin.toml` is optional.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder =
            Config::builder().add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));
        if let Some(path) = config_file {
            builder = builder.add_source(File::from(path));
        }
        let settings = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.site_url.trim().is_empty() {
            return Err(ConfigError::EmptySiteUrl);
        }
        Ok(self)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = AppConfig::default();
        assert_eq!(config.site_url, "http://localhost:3000/mock_api");
        assert_eq!(config.state_dir, PathBuf::from(".bantin"));
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.locale, Locale::Vi);
        assert_eq!(config.logging.format, LogFormat::Compact);
    }

    #[test]
    fn empty_site_url_is_rejected() {
        let config = AppConfig {
            site_url: "  ".into(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::EmptySiteUrl)
        ));
    }

    #[test]
    fn toml_fragment_deserializes() {
        let config: AppConfig = toml_fragment(
            r#"
            site_url = "https://panel.example.com/api"
            locale = "en"

            [logging]
            format = "json"

            [cache]
            post_limit = 16
            "#,
        );
        assert_eq!(config.site_url, "https://panel.example.com/api");
        assert_eq!(config.locale, Locale::En);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.cache.post_limit, 16);
        // Untouched sections keep their defaults.
        assert_eq!(config.cache.category_list_limit, 50);
    }

    fn toml_fragment(raw: &str) -> AppConfig {
        Config::builder()
            .add_source(config::File::from_str(raw, config::FileFormat::Toml))
            .build()
            .expect("build")
            .try_deserialize()
            .expect("deserialize")
    }
}
