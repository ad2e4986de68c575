//! bantin list cache.
//!
//! One cached slot per (resource, query-parameters) pair, LRU-bounded per
//! resource. Invalidation never drops data eagerly: slots are marked stale
//! and re-fetched on the next read, while reconciliation walks rewrite every
//! cached page in place so already-loaded screens reflect mutations
//! immediately. A write ledger orders mutation responses per entity so a
//! slow, stale response can never overwrite a newer local edit.
//!
//! All cache state is owned by the [`crate::resources::SyncContext`] that
//! created it; there are no process-global singletons.

mod config;
mod keys;
mod ledger;
pub(crate) mod lock;
mod store;

pub use config::CacheConfig;
pub use keys::{EntityKey, ResourceKind, hash_value};
pub use ledger::{Epoch, WriteLedger};
pub use store::{CachedList, ListStore};
