//! # Accord
//!
//! **Schema-driven route contracts for HTTP services.**
//!
//! Declare a contract for a route (the shape of its params, query, headers,
//! request body and response) and Accord will:
//!
//! - validate and coerce every inbound field before the handler runs,
//!   answering `422` with a structured error tree on failure
//! - check the handler's reply against the declared response schema and log
//!   a suggested schema fix when it drifts
//! - document the route in an OpenAPI 3.1 document served with Swagger UI
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use accord::prelude::*;
//! use serde_json::{json, Value};
//!
//! async fn get_user(request: ApiRequest) -> Value {
//!     json!({"id": request.params()["id"].clone(), "name": "Ada"})
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let app = TypedRouter::new()
//!         .docs(DocsMount::titled("Users"))
//!         .get_with(
//!             "/users/{id}",
//!             Contract::builder()
//!                 .params(Schema::object([("id", Schema::integer().coerce())]))
//!                 .response(Schema::object([
//!                     ("id", Schema::integer()),
//!                     ("name", Schema::string()),
//!                 ])),
//!             get_user,
//!         )
//!         .build()?;
//!
//!     Server::new(ServerConfig::default(), app).run().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Request flow
//!
//! ```text
//! Request → Params → Query → Headers → Body → Response Guard → [layers] → Handler
//!                                                   ↓
//! Reply   ←─────────── checked against the response schema ←──────────────┘
//! ```

#![doc(html_root_url = "https://docs.rs/accord/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Schema engine and contracts
pub use accord_contract as contract;

// Validation stages and global configuration
pub use accord_middleware as middleware;

// Path router
pub use accord_router as router;

// OpenAPI registry and Swagger UI
pub use accord_docs as docs;

// Typed router and dispatch
pub use accord_core as core;

// HTTP server
pub use accord_server as server;

// Layered configuration
pub use accord_config as config;

// Logging setup
pub use accord_telemetry as telemetry;

/// Prelude module for convenient imports.
///
/// ```rust
/// use accord::prelude::*;
///
/// let contract = Contract::builder()
///     .response(Schema::object([("ok", Schema::boolean())]))
///     .build();
/// assert!(contract.is_ok());
/// ```
pub mod prelude {
    pub use accord_contract::{Contract, ContractError, IntoContract, Schema, SharedSchema};

    pub use accord_middleware::{
        configure, reset_config, ApiRequest, ConfigPatch, IntoReply, Json, Reply,
        ValidationConfig, ValidationKind,
    };

    pub use accord_docs::{DocsMount, DocsRegistry, OpenApiGenerator};

    pub use accord_core::{typed, App, RouterError, TypedRouter};

    pub use accord_server::{Server, ServerConfig, ShutdownSignal};

    pub use accord_config::{AccordConfig, ConfigLoader};

    pub use accord_telemetry::{init_logging, LogConfig};

    pub use http::{Method, StatusCode};
}
