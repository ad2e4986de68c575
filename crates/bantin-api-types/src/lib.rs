//! Shared request and response types for the bantin content administration API.
//!
//! Everything here mirrors the backend's JSON contract byte for byte: entity
//! records as they travel the wire, list and mutation envelopes, and the
//! authentication exchange. Numeric identifiers are serialized as strings by
//! the backend (`serde` helpers in [`string_id`] accept bare numbers too,
//! since some endpoints are sloppy about it).

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Serde adapter for numeric identifiers that cross the wire as strings.
///
/// Serializes `i64` as a JSON string. Deserialization is tolerant: both
/// `"42"` and `42` are accepted, matching the backend's mixed emissions.
pub mod string_id {
    use std::fmt;

    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};

    pub fn serialize<S>(id: &i64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(id)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<i64, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct IdVisitor;

        impl Visitor<'_> for IdVisitor {
            type Value = i64;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a numeric identifier as a string or number")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<i64, E> {
                value.parse().map_err(E::custom)
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> Result<i64, E> {
                Ok(value)
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<i64, E> {
                i64::try_from(value).map_err(E::custom)
            }
        }

        deserializer.deserialize_any(IdVisitor)
    }
}

// ============================================================================
// Entity records
// ============================================================================

/// An account, self-editable only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    /// Opaque hash; carried on the wire, never displayed.
    #[serde(default)]
    pub password: String,
    /// `true` = active, `false` = disabled.
    pub status: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    #[serde(default)]
    pub creator_id: Option<Uuid>,
    #[serde(default)]
    pub modifier_id: Option<Uuid>,
}

/// A content category. `order` defines the display position; reordering
/// rewrites it densely over the visible set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(with = "string_id")]
    pub id: i64,
    pub slug: String,
    pub name_vi: String,
    #[serde(default)]
    pub name_en: Option<String>,
    pub order: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    pub creator_id: Uuid,
    #[serde(default)]
    pub modifier_id: Option<Uuid>,
}

/// A bilingual post. Content fields carry the inline line convention
/// (`# `, `## `, `- `, `**bold**`) interpreted at render time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    #[serde(with = "string_id")]
    pub id: i64,
    pub slug: String,
    pub title_vi: String,
    #[serde(default)]
    pub title_en: Option<String>,
    #[serde(default)]
    pub description_vi: Option<String>,
    #[serde(default)]
    pub description_en: Option<String>,
    #[serde(default)]
    pub content_vi: String,
    #[serde(default)]
    pub content_en: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(with = "string_id")]
    pub category_id: i64,
    pub creator_id: Uuid,
    #[serde(default)]
    pub modifier_id: Option<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

// ============================================================================
// Read envelopes
// ============================================================================

/// Pagination and filter parameters for list endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListQuery {
    pub page: u32,
    #[serde(rename = "pageSize")]
    pub page_size: u32,
    #[serde(default)]
    pub keyword: Option<String>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 10,
            keyword: None,
        }
    }
}

impl ListQuery {
    /// Render as URL query pairs in the order the backend expects.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.to_string()),
            ("pageSize", self.page_size.to_string()),
        ];
        if let Some(keyword) = &self.keyword {
            pairs.push(("keyword", keyword.clone()));
        }
        pairs
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(rename = "totalItem")]
    pub total_item: u64,
}

/// List endpoint envelope: `{data: [...], pagination: {totalItem}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

impl<T> ListResponse<T> {
    /// Total item count across all pages; zero when the envelope omits it.
    pub fn total(&self) -> u64 {
        self.pagination.as_ref().map_or(0, |p| p.total_item)
    }
}

// ============================================================================
// Mutation envelopes
// ============================================================================

/// Mutation envelope: `{data: Entity}`. Some endpoints answer with an empty
/// body or a bare message; callers must treat `data` as optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutationResponse<T> {
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Error body shape; `message` is surfaced to the user when present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

// ============================================================================
// Requests
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// `POST /users/login` answer. Tokens and user are absent on rejection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(rename = "accessToken", default)]
    pub access_token: Option<String>,
    #[serde(rename = "refreshToken", default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub data: Option<User>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCreateRequest {
    pub email: String,
    pub password: String,
    /// Admin-created accounts default to active.
    pub status: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCreateRequest {
    /// Derived from `name_vi` when omitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    pub name_vi: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_en: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostCreateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    pub title_vi: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_en: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description_vi: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description_en: Option<String>,
    pub content_vi: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_en: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(with = "string_id")]
    pub category_id: i64,
}

/// One element of the `PATCH /categories/order` bulk payload.
///
/// Identifiers go out as bare numbers here; the order endpoint predates the
/// string-id convention the rest of the API follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderUpdate {
    pub id: i64,
    pub order: i32,
}
