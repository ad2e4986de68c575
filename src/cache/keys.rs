//! Cache key definitions.
//!
//! Defines `EntityKey` for write ordering and `ResourceKind` for slot
//! grouping. List slots are keyed by the hash of their query parameters;
//! two different parameter sets can never collide into one slot short of a
//! hash collision, which only costs an extra fetch.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use uuid::Uuid;

use bantin_api_types::{Category, Post, User};

/// The three synchronized resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Users,
    Categories,
    Posts,
}

impl ResourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Categories => "categories",
            Self::Posts => "posts",
        }
    }
}

/// Identifies one server-authoritative record for write ordering and
/// reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKey {
    User(Uuid),
    Category(i64),
    Post(i64),
}

impl EntityKey {
    pub fn resource(self) -> ResourceKind {
        match self {
            Self::User(_) => ResourceKind::Users,
            Self::Category(_) => ResourceKind::Categories,
            Self::Post(_) => ResourceKind::Posts,
        }
    }
}

impl From<&User> for EntityKey {
    fn from(user: &User) -> Self {
        Self::User(user.id)
    }
}

impl From<&Category> for EntityKey {
    fn from(category: &Category) -> Self {
        Self::Category(category.id)
    }
}

impl From<&Post> for EntityKey {
    fn from(post: &Post) -> Self {
        Self::Post(post.id)
    }
}

/// Compute a hash for any hashable value.
pub fn hash_value<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}
