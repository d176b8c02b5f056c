//! # Accord Server
//!
//! HTTP/1.1 server for Accord applications, built on Hyper and Tokio.
//!
//! - Request bodies are collected up to a configurable limit (`413` beyond it)
//! - Body collection and handling are bounded by a request timeout
//! - Graceful shutdown on Ctrl-C, SIGTERM or a [`ShutdownSignal`]
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use accord_contract::{Contract, Schema};
//! use accord_core::TypedRouter;
//! use accord_middleware::ApiRequest;
//! use accord_server::{Server, ServerConfig};
//! use serde_json::{json, Value};
//!
//! async fn health(_request: ApiRequest) -> Value {
//!     json!({"status": "ok"})
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let app = TypedRouter::new()
//!         .get_with(
//!             "/health",
//!             Contract::builder().response(Schema::object([("status", Schema::string())])),
//!             health,
//!         )
//!         .build()?;
//!
//!     let config = ServerConfig::builder().http_addr("0.0.0.0:8080").build();
//!     Server::new(config, app).run().await?;
//!     Ok(())
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/accord-server/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod server;
mod shutdown;

pub use config::{
    ServerConfig, ServerConfigBuilder, DEFAULT_HTTP_ADDR, DEFAULT_MAX_BODY_SIZE,
    DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_SHUTDOWN_TIMEOUT_SECS,
};
pub use error::{ServerError, ServerResult};
pub use server::Server;
pub use shutdown::{ConnectionToken, ConnectionTracker, ShutdownReceiver, ShutdownSignal};
