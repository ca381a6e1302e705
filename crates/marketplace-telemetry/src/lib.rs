//! # Marketplace Telemetry
//!
//! Structured logging setup shared by Sourcemart binaries and the
//! integration test suite.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use marketplace_telemetry::{LoggingConfig, init_logging};
//!
//! fn main() {
//!     let config = LoggingConfig::from_env();
//!     init_logging(&config).expect("failed to init logging");
//!
//!     // Application code here; tracing macros now emit structured logs.
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `RUST_LOG` | `info` | Log level filter (env-filter syntax) |
//! | `SM_JSON_LOGS` | unset | Any value switches output to JSON |

#![warn(missing_docs)]

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Telemetry initialization errors.
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// The env-filter directive string was invalid.
    #[error("Invalid log filter: {0}")]
    Filter(String),

    /// A global subscriber was already installed.
    #[error("Logging already initialized: {0}")]
    AlreadyInitialized(String),
}

/// Logging configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default level directive when `RUST_LOG` is unset.
    pub log_level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json_logs: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

impl LoggingConfig {
    /// Build a configuration from the environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            json_logs: std::env::var("SM_JSON_LOGS").is_ok(),
        }
    }
}

/// Install the global tracing subscriber.
///
/// Call once at process start. Subsequent calls fail with
/// [`TelemetryError::AlreadyInitialized`]; test harnesses that may race on
/// initialization should use [`try_init_for_tests`] instead.
pub fn init_logging(config: &LoggingConfig) -> Result<(), TelemetryError> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| TelemetryError::Filter(e.to_string()))?;

    if config.json_logs {
        let json_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_file(true)
            .with_line_number(true);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(json_layer)
            .try_init()
            .map_err(|e| TelemetryError::AlreadyInitialized(e.to_string()))?;
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer().with_target(true);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
            .map_err(|e| TelemetryError::AlreadyInitialized(e.to_string()))?;
    }

    Ok(())
}

/// Best-effort initialization for test binaries.
///
/// Multiple integration tests run in one process; only the first call
/// installs the subscriber and the rest are no-ops.
pub fn try_init_for_tests() {
    let _ = init_logging(&LoggingConfig::from_env());
}
