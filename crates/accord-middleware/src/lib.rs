//! # Accord Middleware
//!
//! Validation middleware for the Accord framework.
//!
//! Every contract-bound route gets its own [`Pipeline`]. The stages run in a
//! fixed order:
//!
//! ```text
//! Request → Params → Query → Headers → Body → ResponseGuard → Handler
//!                                                  ↓
//! Response ←──────────────────────────────── (reply checked)
//! ```
//!
//! | Stage          | Factory              | On failure                |
//! |----------------|----------------------|---------------------------|
//! | Params         | [`validate_params`]  | 422, `type: "params"`     |
//! | Query          | [`validate_query`]   | 422, `type: "query"`      |
//! | Headers        | [`validate_headers`] | 422, `type: "headers"`    |
//! | Body           | [`validate_body`]    | 422, `type: "request"`    |
//! | Response guard | [`validate_response`]| 500, `type: "response"`   |
//!
//! A failing stage marks the request context so that the response guard
//! does not re-validate the error body it produced.
//!
//! ## Example
//!
//! ```
//! use accord_contract::Schema;
//! use accord_middleware::{validate_body, validate_response, Pipeline, Stage};
//!
//! let user = Schema::object([("name", Schema::string())]);
//! let pipeline = Pipeline::builder()
//!     .stage(Stage::ResponseGuard, validate_response(user.clone()))
//!     .stage(Stage::Body, validate_body(user))
//!     .build();
//!
//! assert_eq!(pipeline.stage_names(), ["body-validator", "response-guard"]);
//! ```
//!
//! ## Configuration
//!
//! Error formatting, response validation and the skipped statuses are
//! process-wide settings changed through [`configure`]. Stages can be pinned
//! to a fixed [`ValidationConfig`] instead with [`ConfigSource::Fixed`].

#![doc(html_root_url = "https://docs.rs/accord-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod context;
pub mod diagnostic;
pub mod error;
pub mod middleware;
pub mod pipeline;
pub mod stages;
pub mod types;

pub use config::{
    configure, current_config, reset_config, ConfigPatch, ConfigSource, ValidationConfig,
    DEFAULT_SKIPPED_STATUSES,
};
pub use context::{MiddlewareContext, RequestId};
pub use diagnostic::response_diagnostic;
pub use error::{default_error_body, ErrorContext, ErrorFormatter, ValidationKind};
pub use middleware::{BoxFuture, FnMiddleware, Middleware, Next};
pub use pipeline::{BoxedMiddleware, Pipeline, PipelineBuilder, Stage};
pub use stages::{
    validate_body, validate_headers, validate_params, validate_query, validate_response, Facet,
    FieldValidator, ResponseGuard, ResponseSchemas,
};
pub use types::{ApiRequest, IntoReply, Json, Reply, ReplyBody, Response, ValidatedHeaders};
