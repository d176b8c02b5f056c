//! # Accord Contract
//!
//! Schema engine and route contract model for the Accord framework.
//!
//! A route contract declares what a route accepts (path parameters, query,
//! headers, body) and what it answers with, keyed by status code. The same
//! declaration drives request validation, response checking and the
//! generated OpenAPI document.
//!
//! ## Schemas
//!
//! Anything implementing [`Validate`] can back a contract field. The crate
//! ships a builder-style [`Schema`] that covers JSON types, coercion,
//! defaults and the usual string/number/array constraints.
//!
//! ```
//! use accord_contract::{Schema, Validate};
//! use serde_json::json;
//!
//! let user = Schema::object([
//!     ("name", Schema::string().min_length(1)),
//!     ("age", Schema::number().coerce()),
//! ]);
//!
//! let parsed = user.safe_parse(&json!({"name": "mike", "age": "25"})).unwrap();
//! assert_eq!(parsed, json!({"name": "mike", "age": 25}));
//!
//! let issues = user.safe_parse(&json!({"name": ""})).unwrap_err();
//! assert_eq!(issues.len(), 2);
//! ```
//!
//! ## Contracts
//!
//! ```
//! use accord_contract::{Contract, Schema};
//!
//! let contract = Contract::builder()
//!     .request(Schema::object([("name", Schema::string())]))
//!     .response(Schema::object([("id", Schema::integer())]))
//!     .responses(404, Schema::object([("message", Schema::string())]))
//!     .summary("Create a user")
//!     .build()
//!     .unwrap();
//!
//! assert!(contract.request().is_some());
//! assert_eq!(contract.responses().len(), 1);
//! ```

#![doc(html_root_url = "https://docs.rs/accord-contract/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod contract;
mod error;
mod infer;
mod issue;
mod schema;

pub use contract::{Contract, ContractBuilder, IntoContract};
pub use error::{ContractError, SchemaError};
pub use infer::infer_shape;
pub use issue::{Issue, IssueCode, Issues, PathSegment};
pub use schema::{Kind, Schema, SharedSchema, StringFormat, UnknownKeys, Validate};
