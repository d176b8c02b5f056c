//! Error types for schema and contract construction.

use thiserror::Error;

use crate::issue::Issues;

/// A structural defect in a schema, detected by [`Validate::check`].
///
/// [`Validate::check`]: crate::Validate::check
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SchemaError {
    /// The schema was assembled in a way that can never validate correctly.
    #[error("malformed schema at {path}: {reason}")]
    Malformed {
        /// Location inside the schema, e.g. `$.user.age`.
        path: String,
        /// What is wrong.
        reason: String,
    },

    /// A default value does not satisfy the schema it belongs to.
    #[error("default value at {path} does not satisfy its schema: {issues}")]
    InvalidDefault {
        /// Location inside the schema.
        path: String,
        /// Why the default was rejected.
        issues: Issues,
    },
}

impl SchemaError {
    /// Creates a malformed-schema error.
    pub fn malformed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Malformed {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Errors raised while building a [`Contract`](crate::Contract).
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ContractError {
    /// The contract has no response schema.
    #[error("contract has no response schema")]
    MissingResponse,

    /// One of the declared schemas is malformed.
    #[error("invalid {field} schema: {source}")]
    InvalidSchema {
        /// Contract field holding the schema (`request`, `responses.404`, ...).
        field: String,
        /// The structural defect.
        #[source]
        source: SchemaError,
    },

    /// A status-keyed response uses a code outside `100..=599`.
    #[error("invalid response status code {0}")]
    InvalidStatus(u16),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contract_error_display() {
        let err = ContractError::InvalidSchema {
            field: "request".to_string(),
            source: SchemaError::malformed("$.name", "min_length 5 exceeds max_length 2"),
        };
        assert_eq!(
            err.to_string(),
            "invalid request schema: malformed schema at $.name: min_length 5 exceeds max_length 2"
        );
        assert_eq!(
            ContractError::InvalidStatus(42).to_string(),
            "invalid response status code 42"
        );
    }
}
