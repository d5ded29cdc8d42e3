use std::io;

use thiserror::Error;
use tracing::subscriber::{set_global_default, SetGlobalDefaultError};
use tracing::Subscriber;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_log::LogTracer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Registry};

#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to redirect log records to tracing: {0}")]
    Logger(#[from] log::SetLoggerError),

    #[error("Failed to set tracing subscriber: {0}")]
    Subscriber(#[from] SetGlobalDefaultError),
}

/// Compose multiple layers into a tracing subscriber.
///
/// Spans and events are filtered by `RUST_LOG` when set, by `env_filter` otherwise, and written
/// to stdout in Bunyan compatible format.
pub fn make_subscriber(name: impl Into<String>, env_filter: impl Into<String>) -> impl Subscriber + Send + Sync {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(env_filter.into()));
    let formatting_layer = BunyanFormattingLayer::new(name.into(), io::stdout);

    Registry::default()
        .with(env_filter)
        .with(JsonStorageLayer)
        .with(formatting_layer)
}

/// Installs the subscriber as global default and redirects all `log` records to it. Can only
/// succeed once per process.
pub fn init_subscriber(subscriber: impl Subscriber + Send + Sync) -> Result<(), TelemetryError> {
    LogTracer::init()?;
    set_global_default(subscriber)?;

    Ok(())
}

/// Utility macro to log information about an error and map it to some other type.
///
/// This is meant to be used in a `Result::map_err`, e.g.:
///
/// ```ignore
/// serde_json::to_string(&record).map_err(simple_err_map!("Failed serializing.", ConvertError::Serialization))?;
/// ```
///
/// Gets expanded into:
///
/// ```ignore
/// serde_json::to_string(&record).map_err(|e| {
///     tracing::error!(error = ?e, "Failed serializing.");
///     ConvertError::Serialization
/// })?;
/// ```
#[macro_export]
macro_rules! simple_err_map {
    ($msg:expr, $result:expr) => {
        |e| {
            tracing::error!(error = ?e, $msg);
            $result
        }
    };
}
