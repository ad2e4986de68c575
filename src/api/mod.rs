//! HTTP transport to the content API.

mod client;

pub use client::{ApiClient, ApiError};
