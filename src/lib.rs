//! bantin: client-side data synchronization for a bilingual (vi/en)
//! content administration panel.
//!
//! Three REST resources (users, categories, posts) are read through a
//! process-wide list cache and mutated through reconciling handles: every
//! successful write is merged into every loaded page, flagged stale, and
//! re-fetched lazily, so screens stay coherent without manual reloads. A
//! per-entity write ledger discards stale mutation responses, a reorder
//! controller turns drag results into dense 1-based bulk updates, and a
//! file-backed session store carries the signed-in user, tokens, and locale
//! across restarts.
//!
//! The crate is transport-complete but headless; `bantin-cli` is the
//! reference front-end.

pub mod api;
pub mod cache;
pub mod config;
pub mod domain;
pub mod i18n;
pub mod resources;
pub mod session;
pub mod telemetry;

pub use bantin_api_types as api_types;
