//! Process-wide logging setup.
//!
//! Installs a `tracing` subscriber with an env filter and a text or JSON
//! formatter, and forwards `log` records into it so database and migration
//! messages end up in the same stream.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

use crate::config::{LogFormat, LoggingConfig};
use crate::error::LoggingError;

/// Builds the filter: `RUST_LOG` wins over the configured level.
pub fn build_filter(config: &LoggingConfig) -> Result<EnvFilter, LoggingError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&config.level).map_err(|e| LoggingError::InvalidFilter {
        filter: config.level.clone(),
        reason: e.to_string(),
    })
}

/// Installs the global subscriber. Fails instead of panicking when called
/// a second time.
///
/// The `log` bridge goes in first: if another `log` logger already owns the
/// process, nothing is installed and the error is `LoggerAlreadySet`.
pub fn init(config: &LoggingConfig) -> Result<(), LoggingError> {
    let filter = build_filter(config)?;

    tracing_log::LogTracer::init().map_err(|_| LoggingError::LoggerAlreadySet)?;

    let fmt_layer = match config.format {
        LogFormat::Json => fmt::layer().json().with_target(true).boxed(),
        LogFormat::Text => fmt::layer().with_target(true).boxed(),
    };

    let subscriber = tracing_subscriber::registry().with(fmt_layer).with(filter);
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|_| LoggingError::SubscriberAlreadySet)?;

    Ok(())
}
