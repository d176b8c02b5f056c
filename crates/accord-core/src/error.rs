//! Error types for route registration.

use std::fmt;

use accord_contract::ContractError;
use http::Method;
use thiserror::Error;

/// Result type alias using [`RouterError`].
pub type RouterResult<T> = Result<T, RouterError>;

/// A registration whose contract could not be built.
#[derive(Debug, Clone, PartialEq)]
pub struct MalformedRoute {
    /// Methods the route was registered for.
    pub methods: Vec<Method>,
    /// Path template.
    pub path: String,
    /// Why the contract was rejected.
    pub error: ContractError,
}

impl fmt::Display for MalformedRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let methods: Vec<&str> = self.methods.iter().map(Method::as_str).collect();
        write!(f, "{} {}: {}", methods.join("|"), self.path, self.error)
    }
}

/// Errors raised by [`TypedRouter::build`](crate::TypedRouter::build).
#[derive(Debug, Error)]
pub enum RouterError {
    /// Strict mode is on and at least one route has a malformed contract.
    #[error("{} route(s) registered with a malformed contract: {}", .0.len(), list(.0))]
    MalformedContracts(Vec<MalformedRoute>),
}

impl RouterError {
    /// The malformed registrations.
    #[must_use]
    pub fn malformed_routes(&self) -> &[MalformedRoute] {
        match self {
            Self::MalformedContracts(routes) => routes,
        }
    }
}

fn list(routes: &[MalformedRoute]) -> String {
    routes
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_route_display() {
        let route = MalformedRoute {
            methods: vec![Method::GET, Method::HEAD],
            path: "/users".to_string(),
            error: ContractError::MissingResponse,
        };
        assert_eq!(
            route.to_string(),
            "GET|HEAD /users: contract has no response schema"
        );
    }

    #[test]
    fn test_router_error_lists_routes() {
        let err = RouterError::MalformedContracts(vec![
            MalformedRoute {
                methods: vec![Method::POST],
                path: "/a".to_string(),
                error: ContractError::MissingResponse,
            },
            MalformedRoute {
                methods: vec![Method::PUT],
                path: "/b".to_string(),
                error: ContractError::InvalidStatus(42),
            },
        ]);
        assert_eq!(
            err.to_string(),
            "2 route(s) registered with a malformed contract: \
             POST /a: contract has no response schema; PUT /b: invalid response status code 42"
        );
        assert_eq!(err.malformed_routes().len(), 2);
    }
}
