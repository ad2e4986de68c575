//! Tracing and metrics bootstrap.

use std::sync::Once;

use metrics::{Unit, describe_counter};
use thiserror::Error;
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingSettings};

static METRIC_DESCRIPTIONS: Once = Once::new();

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("invalid log level `{level}`: {message}")]
    Level { level: String, message: String },
    #[error("failed to install tracing subscriber: {0}")]
    Install(String),
}

/// Install a global tracing subscriber using the provided logging settings.
pub fn init(logging: &LoggingSettings) -> Result<(), TelemetryError> {
    describe_metrics();

    let directive = logging
        .level
        .parse()
        .map_err(|err: tracing_subscriber::filter::ParseError| TelemetryError::Level {
            level: logging.level.clone(),
            message: err.to_string(),
        })?;
    let env_filter = EnvFilter::builder()
        .with_default_directive(directive)
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer().compact().with_target(true).boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(|err| TelemetryError::Install(err.to_string()))
}

fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            "bantin_cache_hit_total",
            Unit::Count,
            "List and post lookups answered by a fresh cache slot."
        );
        describe_counter!(
            "bantin_cache_miss_total",
            Unit::Count,
            "List and post lookups that had to go to the network."
        );
        describe_counter!(
            "bantin_sync_stale_discard_total",
            Unit::Count,
            "Mutation responses discarded because a newer write already applied."
        );
    });
}
