//! Cache sizing.

use std::num::NonZeroUsize;

use serde::Deserialize;

const DEFAULT_USER_LIST_LIMIT: usize = 30;
const DEFAULT_CATEGORY_LIST_LIMIT: usize = 50;
const DEFAULT_POST_LIST_LIMIT: usize = 50;
const DEFAULT_POST_LIMIT: usize = 200;

/// Slot limits per resource, from `bantin.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum cached user list pages.
    pub user_list_limit: usize,
    /// Maximum cached category list pages.
    pub category_list_limit: usize,
    /// Maximum cached post list pages.
    pub post_list_limit: usize,
    /// Maximum posts in the by-id KV cache.
    pub post_limit: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            user_list_limit: DEFAULT_USER_LIST_LIMIT,
            category_list_limit: DEFAULT_CATEGORY_LIST_LIMIT,
            post_list_limit: DEFAULT_POST_LIST_LIMIT,
            post_limit: DEFAULT_POST_LIMIT,
        }
    }
}

impl CacheConfig {
    /// User list limit as `NonZeroUsize`, clamping to 1 if zero.
    pub fn user_list_limit_non_zero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.user_list_limit).unwrap_or(NonZeroUsize::MIN)
    }

    /// Category list limit as `NonZeroUsize`, clamping to 1 if zero.
    pub fn category_list_limit_non_zero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.category_list_limit).unwrap_or(NonZeroUsize::MIN)
    }

    /// Post list limit as `NonZeroUsize`, clamping to 1 if zero.
    pub fn post_list_limit_non_zero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.post_list_limit).unwrap_or(NonZeroUsize::MIN)
    }

    /// Post KV limit as `NonZeroUsize`, clamping to 1 if zero.
    pub fn post_limit_non_zero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.post_limit).unwrap_or(NonZeroUsize::MIN)
    }
}
