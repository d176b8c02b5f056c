//! Typed configuration for Accord services.
//!
//! [`AccordConfig`] groups four sections, each converting into the runtime
//! type of the crate it configures:
//!
//! - [`ServerSection`] → [`accord_server::ServerConfig`]
//! - [`DocsSection`] → [`accord_docs::DocsMount`]
//! - [`ValidationSection`] → [`accord_middleware::ConfigPatch`]
//! - [`LoggingSection`] → [`accord_telemetry::LogConfig`]
//!
//! [`ConfigLoader`] layers defaults, a TOML or JSON file and
//! `PREFIX__SECTION__KEY` environment variables, then validates the result.
//!
//! # Configuration File Format
//!
//! ```toml
//! [server]
//! http_addr = "0.0.0.0:8080"
//! shutdown_timeout_secs = 30
//! request_timeout_secs = 30
//! max_body_size = 1048576
//!
//! [docs]
//! enabled = true
//! json_path = "/docs/openapi.json"
//! ui_path = "/docs"
//! title = "Orders API"
//!
//! [validation]
//! validate_responses = true
//! skip_response_validation_for_status = [400, 401, 403, 404, 409, 422, 500, 502, 503]
//!
//! [logging]
//! level = "info"
//! format = "json"
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::AccordConfig;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{DocsSection, LoggingSection, ServerSection, ValidationSection};
