//! Resource handles: cached reads and reconciling mutations per resource.
//!
//! A [`SyncContext`] is created once at application start and owns every
//! piece of shared state: the HTTP client, the list cache, the write
//! ledger, and the session store. Screens ask it for a per-resource handle
//! and never touch the cache directly; reconciliation stays a single point
//! of truth.

mod categories;
mod posts;
mod users;

pub use categories::{Categories, ReorderOutcome};
pub use posts::Posts;
pub use users::Users;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::api::{ApiClient, ApiError};
use crate::cache::{CacheConfig, ListStore, WriteLedger};
use crate::domain::error::DomainError;
use crate::session::{SessionError, SessionStore};

/// One fetched or cache-served page.
#[derive(Debug, Clone, PartialEq)]
pub struct ListPage<T> {
    pub items: Vec<T>,
    pub total: u64,
}

impl<T> ListPage<T> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
        }
    }
}

/// Outcome of an update attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome<T> {
    /// Nothing differed from the loaded record; no request was sent.
    Unchanged,
    Updated(T),
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("not signed in")]
    NotSignedIn,
    #[error("only the creator may modify this record")]
    NotOwner,
    #[error("only your own account can be edited")]
    SelfEditOnly,
    #[error("login rejected: {message}")]
    LoginRejected { message: String },
    #[error("request body does not serialize: {0}")]
    Encode(#[from] serde_json::Error),
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Root application context for data access.
pub struct SyncContext {
    api: ApiClient,
    store: ListStore,
    ledger: WriteLedger,
    session: Arc<SessionStore>,
}

impl SyncContext {
    pub fn new(api: ApiClient, cache: &CacheConfig, session: Arc<SessionStore>) -> Self {
        Self {
            api,
            store: ListStore::new(cache),
            ledger: WriteLedger::new(),
            session,
        }
    }

    pub fn users(&self) -> Users<'_> {
        Users::new(self)
    }

    pub fn categories(&self) -> Categories<'_> {
        Categories::new(self)
    }

    pub fn posts(&self) -> Posts<'_> {
        Posts::new(self)
    }

    pub fn store(&self) -> &ListStore {
        &self.store
    }

    pub fn ledger(&self) -> &WriteLedger {
        &self.ledger
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    fn bearer(&self) -> Option<String> {
        self.session.access_token()
    }
}

/// Accept both `{data: Entity}` envelopes and bare entities; the backend
/// mixes the two across endpoints.
fn entity_from_mutation<T: DeserializeOwned>(value: &serde_json::Value) -> Option<T> {
    match value.get("data") {
        Some(data) => serde_json::from_value(data.clone()).ok(),
        None => serde_json::from_value(value.clone()).ok(),
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::entities::fixtures::{actor_id, sample_category};

    use super::*;
    use bantin_api_types::Category;

    #[test]
    fn entity_from_mutation_accepts_both_shapes() {
        let category = sample_category(1, 1, actor_id());
        let bare = serde_json::to_value(&category).expect("encode");
        let enveloped = serde_json::json!({ "data": bare.clone() });

        assert_eq!(
            entity_from_mutation::<Category>(&bare).expect("bare"),
            category
        );
        assert_eq!(
            entity_from_mutation::<Category>(&enveloped).expect("enveloped"),
            category
        );
        assert!(entity_from_mutation::<Category>(&serde_json::json!({})).is_none());
        assert!(entity_from_mutation::<Category>(&serde_json::json!({"data": null})).is_none());
    }
}
