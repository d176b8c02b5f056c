//! # Accord Docs
//!
//! API documentation for the Accord framework.
//!
//! This crate provides:
//! - **[`DocsRegistry`]**: collects every route registered with a contract
//! - **[`OpenApiGenerator`]**: compiles the collected routes into an OpenAPI 3.1 document
//! - **[`SwaggerUi`]**: an interactive page rendering that document
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use accord_contract::{Contract, Schema};
//! use accord_docs::DocsRegistry;
//! use http::Method;
//!
//! let registry = DocsRegistry::new();
//! let contract = Contract::builder()
//!     .response(Schema::object([("id", Schema::integer())]))
//!     .build()
//!     .unwrap();
//! registry.register_path("/users/{id}", Method::GET, Arc::new(contract), vec!["Users".into()]);
//!
//! let doc = registry.generate_document(Some("Users API")).unwrap();
//! assert_eq!(doc.info.title, "Users API");
//! assert_eq!(doc.operation("/users/{id}", &Method::GET).unwrap().summary, "GET /users/{id}");
//! ```

#![doc(html_root_url = "https://docs.rs/accord-docs/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod openapi;
mod registry;
mod swagger;

pub use error::{DocsError, DocsResult};
pub use openapi::{
    status_description, Info, MediaType, OpenApi, OpenApiGenerator, Operation, Parameter,
    ParameterIn, PathItem, RequestBody, Response, Server, Tag, DEFAULT_TITLE, DEFAULT_VERSION,
};
pub use registry::{DocsRegistry, RouteDefinition};
pub use swagger::{DocExpansion, DocsMount, SwaggerUi, DEFAULT_JSON_PATH, DEFAULT_UI_PATH};
