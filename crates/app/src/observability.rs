//! Tracing subscriber initialisation.

use thiserror::Error;
use tracing_subscriber::{
    EnvFilter, Registry,
    layer::{Layer, SubscriberExt},
    util::{SubscriberInitExt, TryInitError},
};

use crate::config::{LogFormat, LoggingConfig};

#[derive(Debug, Error)]
pub enum ObservabilityError {
    #[error("failed to install tracing subscriber")]
    Init(#[from] TryInitError),
}

/// Install the global subscriber. `RUST_LOG`, when set, wins over the
/// configured level.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init(config: &LoggingConfig) -> Result<(), ObservabilityError> {
    match config.log_format {
        LogFormat::Compact => init_with_layer(
            config,
            tracing_subscriber::fmt::layer()
                .compact()
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        ),
        LogFormat::Json => init_with_layer(
            config,
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .with_target(true),
        ),
    }
}

fn build_env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},sqlx=warn", config.log_level)))
}

fn init_with_layer<L>(config: &LoggingConfig, fmt_layer: L) -> Result<(), ObservabilityError>
where
    L: Layer<Registry> + Send + Sync + 'static,
{
    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(build_env_filter(config))
        .try_init()?;

    Ok(())
}
