//! The root configuration type.

use std::net::SocketAddr;

use accord_telemetry::LogFormat;
use serde::{Deserialize, Serialize};

use crate::{ConfigError, DocsSection, LoggingSection, ServerSection, ValidationSection};

/// Complete Accord service configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load it from files and
/// environment variables.
///
/// ```
/// use accord_config::AccordConfig;
///
/// let config = AccordConfig::default();
/// assert_eq!(config.server.http_addr, "0.0.0.0:8080");
/// assert_eq!(config.docs.json_path, "/docs/openapi.json");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct AccordConfig {
    /// HTTP server.
    #[serde(default)]
    pub server: ServerSection,

    /// Documentation endpoints.
    #[serde(default)]
    pub docs: DocsSection,

    /// Request/response validation.
    #[serde(default)]
    pub validation: ValidationSection,

    /// Logging.
    #[serde(default)]
    pub logging: LoggingSection,
}

impl AccordConfig {
    /// Local development preset: pretty debug logs.
    #[must_use]
    pub fn development() -> Self {
        Self {
            logging: LoggingSection {
                level: "debug".to_string(),
                format: LogFormat::Pretty,
                ansi: true,
                ..LoggingSection::default()
            },
            ..Self::default()
        }
    }

    /// Production preset: JSON logs, docs endpoints off.
    #[must_use]
    pub fn production() -> Self {
        Self {
            docs: DocsSection {
                enabled: false,
                ..DocsSection::default()
            },
            ..Self::default()
        }
    }

    /// Checks cross-field constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.http_addr.parse::<SocketAddr>().is_err() {
            return Err(ConfigError::validation_error(format!(
                "server.http_addr is not a socket address: {}",
                self.server.http_addr
            )));
        }
        if self.server.max_body_size == 0 {
            return Err(ConfigError::validation_error(
                "server.max_body_size must be greater than zero",
            ));
        }
        if self.server.request_timeout_secs == 0 {
            return Err(ConfigError::validation_error(
                "server.request_timeout_secs must be greater than zero",
            ));
        }

        if self.docs.enabled {
            for (field, path) in [
                ("docs.json_path", &self.docs.json_path),
                ("docs.ui_path", &self.docs.ui_path),
            ] {
                if !path.starts_with('/') {
                    return Err(ConfigError::validation_error(format!(
                        "{field} must start with '/': {path}"
                    )));
                }
            }
            if self.docs.json_path == self.docs.ui_path {
                return Err(ConfigError::validation_error(
                    "docs.json_path and docs.ui_path must differ",
                ));
            }
        }

        if let Some(status) = self
            .validation
            .skip_response_validation_for_status
            .iter()
            .find(|status| !(100..=599).contains(*status))
        {
            return Err(ConfigError::validation_error(format!(
                "validation.skip_response_validation_for_status contains invalid status {status}"
            )));
        }

        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::validation_error("logging.level must not be empty"));
        }

        Ok(())
    }
}
