//! Validation stages.
//!
//! - [`fields`]: path parameters, query, headers and body, checked before
//!   the handler runs
//! - [`response`]: the handler's reply, checked before it is sent

pub mod fields;
pub mod response;

pub use fields::{validate_body, validate_headers, validate_params, validate_query, Facet, FieldValidator};
pub use response::{validate_response, ResponseGuard, ResponseSchemas};
