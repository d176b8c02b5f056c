//! Validation failure reporting.
//!
//! Every rejected request and every contract-violating reply is turned into
//! a JSON body by an [`ErrorFormatter`]. The formatter receives an
//! [`ErrorContext`] naming the failing facet, the route and the issues.

use std::fmt;
use std::sync::Arc;

use accord_contract::Issues;
use http::{Method, StatusCode};
use serde::Serialize;
use serde_json::{json, Value};

/// The facet that failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationKind {
    /// Request body.
    Request,
    /// Path parameters.
    Params,
    /// Query string.
    Query,
    /// Request headers.
    Headers,
    /// Handler reply.
    Response,
}

impl ValidationKind {
    /// Wire name (`request`, `params`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Request => "request",
            Self::Params => "params",
            Self::Query => "query",
            Self::Headers => "headers",
            Self::Response => "response",
        }
    }

    /// Capitalized name used in messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::Request => "Request",
            Self::Params => "Params",
            Self::Query => "Query",
            Self::Headers => "Headers",
            Self::Response => "Response",
        }
    }

    /// Status sent for this kind of failure: 422 for client input, 500 for
    /// replies that break their contract.
    pub fn status(self) -> StatusCode {
        match self {
            Self::Response => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

impl fmt::Display for ValidationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything an error formatter gets to see.
#[derive(Debug, Clone, Copy)]
pub struct ErrorContext<'a> {
    /// Failing facet.
    pub kind: ValidationKind,
    /// Request method.
    pub method: &'a Method,
    /// Request path.
    pub path: &'a str,
    /// What went wrong.
    pub issues: &'a Issues,
}

/// Builds the JSON body sent for a validation failure.
pub type ErrorFormatter = Arc<dyn Fn(&ErrorContext<'_>) -> Value + Send + Sync>;

/// The built-in formatter.
///
/// ```
/// use accord_contract::{Issue, IssueCode, Issues};
/// use accord_middleware::{default_error_body, ErrorContext, ValidationKind};
/// use http::Method;
///
/// let issues = Issues::single(Issue::new(IssueCode::InvalidType, "Expected object, received null"));
/// let body = default_error_body(&ErrorContext {
///     kind: ValidationKind::Request,
///     method: &Method::POST,
///     path: "/users",
///     issues: &issues,
/// });
/// assert_eq!(body["error"], "Request validation failed");
/// assert_eq!(body["type"], "request");
/// ```
pub fn default_error_body(ctx: &ErrorContext<'_>) -> Value {
    json!({
        "error": format!("{} validation failed", ctx.kind.label()),
        "type": ctx.kind.as_str(),
        "detail": ctx.issues.tree(),
    })
}
