use std::fs::OpenOptions;
use std::sync::Arc;
use thiserror::Error;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};
use uuid::Uuid;

use crate::config::LoggingConfig;

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("failed to open log file {path}: {source}")]
    LogFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),

    #[error("tracing subscriber already initialized: {0}")]
    AlreadyInitialized(#[from] tracing_subscriber::util::TryInitError),
}

/// Logging options resolved from configuration and CLI flags.
#[derive(Debug, Clone)]
pub struct TelemetryOptions {
    pub level: String,
    pub console: bool,
    pub json: bool,
    pub file: Option<String>,
}

impl TelemetryOptions {
    pub fn from_config(logging: &LoggingConfig, verbose: bool, json: bool) -> Self {
        Self {
            level: if verbose {
                "debug".to_string()
            } else {
                logging.level.to_ascii_lowercase()
            },
            console: logging.console,
            json,
            file: logging.file.clone(),
        }
    }
}

/// Install the global subscriber: console (text or JSON) plus an optional log file.
///
/// `RUST_LOG` directives take precedence over the configured level.
pub fn init_telemetry(options: &TelemetryOptions) -> Result<(), TelemetryError> {
    let filter = match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(directives) if !directives.trim().is_empty() => EnvFilter::try_new(directives)?,
        _ => EnvFilter::try_new(&options.level)?,
    };

    let console = options.console.then(|| {
        if options.json {
            fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .with_writer(std::io::stderr)
                .boxed()
        } else {
            fmt::layer().with_target(false).with_writer(std::io::stderr).boxed()
        }
    });

    let file = match &options.file {
        Some(path) => {
            let log_file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|source| TelemetryError::LogFile {
                    path: path.clone(),
                    source,
                })?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_writer(Arc::new(log_file))
                    .boxed(),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file)
        .with(filter)
        .try_init()?;

    tracing::debug!("git-agent telemetry initialized");
    Ok(())
}

/// Generate a correlation ID for linking the log lines of one operation
pub fn generate_correlation_id() -> String {
    Uuid::new_v4().to_string()
}

/// Span wrapping one orchestrated pull/push
pub fn create_operation_span(operation: &str, repo: &str, correlation_id: &str) -> tracing::Span {
    tracing::info_span!(
        "git_operation",
        operation = operation,
        repo = repo,
        correlation.id = correlation_id,
    )
}
