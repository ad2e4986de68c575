//! Domain entities mirrored from the wire contract, plus display helpers.
//!
//! The records themselves live in `bantin-api-types` so the CLI and any other
//! consumer share one serde definition; logic that belongs to the records
//! (localized field selection, ownership, diffing) lives here.

pub use bantin_api_types::{Category, Post, User};

use crate::domain::types::Locale;

/// Category display name for the given locale, falling back to Vietnamese
/// when the English name is absent or blank.
pub fn category_name(category: &Category, locale: Locale) -> &str {
    match locale {
        Locale::Vi => &category.name_vi,
        Locale::En => non_blank(category.name_en.as_deref()).unwrap_or(&category.name_vi),
    }
}

/// Post title for the given locale, falling back to Vietnamese.
pub fn post_title(post: &Post, locale: Locale) -> &str {
    match locale {
        Locale::Vi => &post.title_vi,
        Locale::En => non_blank(post.title_en.as_deref()).unwrap_or(&post.title_vi),
    }
}

/// Post body for the given locale, falling back to Vietnamese.
pub fn post_content(post: &Post, locale: Locale) -> &str {
    match locale {
        Locale::Vi => &post.content_vi,
        Locale::En => non_blank(post.content_en.as_deref()).unwrap_or(&post.content_vi),
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
