//! Error types for documentation generation.

use thiserror::Error;

/// Errors that can occur during documentation generation.
#[derive(Debug, Error)]
pub enum DocsError {
    /// Failed to serialize the OpenAPI document to JSON.
    #[error("Failed to serialize OpenAPI document: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// A registered route cannot be described.
    #[error("Invalid operation '{method} {path}': {reason}")]
    InvalidOperation {
        /// The route method.
        method: String,
        /// The route path template.
        path: String,
        /// Why the route cannot be described.
        reason: String,
    },

    /// IO error when writing the document to a file.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for documentation operations.
pub type DocsResult<T> = Result<T, DocsError>;
