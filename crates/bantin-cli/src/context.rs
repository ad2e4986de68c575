//! Shared CLI context: configuration, session, and the sync layer.

#![deny(clippy::all, clippy::pedantic)]

use std::sync::Arc;

use thiserror::Error;

use bantin::api::{ApiClient, ApiError};
use bantin::config::{AppConfig, ConfigError};
use bantin::domain::types::Locale;
use bantin::resources::{SyncContext, SyncError};
use bantin::session::{SessionError, SessionStore};
use bantin::telemetry::TelemetryError;

use crate::args::Cli;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Sync(#[from] SyncError),
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("failed to read input file {path}: {source}")]
    InputFile {
        path: String,
        source: std::io::Error,
    },
}

/// Everything the handlers need for one invocation.
pub struct Ctx {
    pub sync: SyncContext,
    pub locale: Locale,
}

/// Settings with CLI flag overrides applied.
pub fn load_config(cli: &Cli) -> Result<AppConfig, CliError> {
    let mut config = AppConfig::load(cli.config_file.as_deref())?;
    if let Some(site) = &cli.site {
        config.site_url.clone_from(site);
    }
    if let Some(dir) = &cli.state_dir {
        config.state_dir.clone_from(dir);
    }
    Ok(config)
}

/// Build the invocation context. Locale precedence: `--locale` flag, then
/// the stored session preference, then configuration.
pub fn build_ctx(cli: &Cli, config: AppConfig) -> Result<Ctx, CliError> {
    let session = Arc::new(SessionStore::open(&config.state_dir)?);
    let locale = cli
        .locale
        .map(Locale::from)
        .or_else(|| session.locale())
        .unwrap_or(config.locale);

    let api = ApiClient::new(&config.site_url, config.request_timeout())?;
    let sync = SyncContext::new(api, &config.cache, session);
    Ok(Ctx { sync, locale })
}
