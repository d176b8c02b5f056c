//! # Accord Telemetry
//!
//! Structured logging for Accord services.
//!
//! Every Accord crate logs through `tracing`: stage outcomes at `debug`,
//! route registration at `info`, malformed contracts and response
//! diagnostics at `warn`. This crate installs the subscriber that turns
//! those events into output.
//!
//! ```rust,no_run
//! use accord_telemetry::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::development()).expect("logging");
//! tracing::info!("ready");
//! ```

#![doc(html_root_url = "https://docs.rs/accord-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod logging;

pub use error::TelemetryError;
pub use logging::{create_env_filter, init_logging, LogConfig, LogFormat};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
