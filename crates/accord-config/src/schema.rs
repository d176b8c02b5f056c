//! Configuration sections.
//!
//! Each section deserializes with defaults for missing fields and rejects
//! unknown ones, and converts into the runtime type of the crate it
//! configures.

use std::time::Duration;

use accord_docs::{DocsMount, DEFAULT_JSON_PATH, DEFAULT_UI_PATH};
use accord_middleware::{ConfigPatch, DEFAULT_SKIPPED_STATUSES};
use accord_server::{
    ServerConfig, DEFAULT_HTTP_ADDR, DEFAULT_MAX_BODY_SIZE, DEFAULT_REQUEST_TIMEOUT_SECS,
    DEFAULT_SHUTDOWN_TIMEOUT_SECS,
};
use accord_telemetry::{LogConfig, LogFormat};
use serde::{Deserialize, Serialize};

/// HTTP server section.
///
/// ```
/// use accord_config::ServerSection;
///
/// let section = ServerSection {
///     http_addr: "127.0.0.1:3000".to_string(),
///     ..ServerSection::default()
/// };
/// assert_eq!(section.to_server_config().http_addr(), "127.0.0.1:3000");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSection {
    /// Bind address, e.g. `"0.0.0.0:8080"`.
    pub http_addr: String,

    /// Graceful shutdown timeout in seconds.
    pub shutdown_timeout_secs: u64,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Largest accepted request body in bytes.
    pub max_body_size: usize,

    /// HTTP/1.1 keep-alive.
    pub keep_alive: bool,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            http_addr: DEFAULT_HTTP_ADDR.to_string(),
            shutdown_timeout_secs: DEFAULT_SHUTDOWN_TIMEOUT_SECS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            keep_alive: true,
        }
    }
}

impl ServerSection {
    /// Builds the server configuration.
    #[must_use]
    pub fn to_server_config(&self) -> ServerConfig {
        ServerConfig::builder()
            .http_addr(self.http_addr.clone())
            .shutdown_timeout(Duration::from_secs(self.shutdown_timeout_secs))
            .request_timeout(Duration::from_secs(self.request_timeout_secs))
            .max_body_size(self.max_body_size)
            .keep_alive(self.keep_alive)
            .build()
    }
}

/// Documentation endpoints section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct DocsSection {
    /// Whether to serve the OpenAPI document and Swagger UI.
    pub enabled: bool,

    /// Path of the OpenAPI JSON document.
    pub json_path: String,

    /// Path of the Swagger UI page.
    pub ui_path: String,

    /// Document title.
    pub title: Option<String>,

    /// Document version.
    pub version: Option<String>,
}

impl Default for DocsSection {
    fn default() -> Self {
        Self {
            enabled: true,
            json_path: DEFAULT_JSON_PATH.to_string(),
            ui_path: DEFAULT_UI_PATH.to_string(),
            title: None,
            version: None,
        }
    }
}

impl DocsSection {
    /// The docs mount, or `None` when docs are disabled.
    #[must_use]
    pub fn to_mount(&self) -> Option<DocsMount> {
        self.enabled.then(|| DocsMount {
            json_path: self.json_path.clone(),
            ui_path: self.ui_path.clone(),
            title: self.title.clone(),
            version: self.version.clone(),
        })
    }
}

/// Request/response validation section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ValidationSection {
    /// Whether replies are checked against their response schema.
    pub validate_responses: bool,

    /// Statuses exempt from single-schema response validation.
    pub skip_response_validation_for_status: Vec<u16>,
}

impl Default for ValidationSection {
    fn default() -> Self {
        Self {
            validate_responses: true,
            skip_response_validation_for_status: DEFAULT_SKIPPED_STATUSES.to_vec(),
        }
    }
}

impl ValidationSection {
    /// A patch for [`accord_middleware::configure`].
    ///
    /// ```
    /// use accord_config::ValidationSection;
    /// use accord_middleware::ValidationConfig;
    ///
    /// let section = ValidationSection {
    ///     validate_responses: false,
    ///     ..ValidationSection::default()
    /// };
    /// let config = ValidationConfig::default().merge(section.to_patch());
    /// assert!(!config.validate_responses());
    /// ```
    #[must_use]
    pub fn to_patch(&self) -> ConfigPatch {
        ConfigPatch::new()
            .validate_responses(self.validate_responses)
            .skip_response_validation_for_status(
                self.skip_response_validation_for_status.iter().copied(),
            )
    }
}

/// Logging section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSection {
    /// Whether logging is enabled.
    pub enabled: bool,

    /// Filter directive.
    pub level: String,

    /// Output format.
    pub format: LogFormat,

    /// Colorized output for the human-readable formats.
    pub ansi: bool,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            format: LogFormat::Json,
            ansi: false,
        }
    }
}

impl LoggingSection {
    /// The telemetry logging configuration.
    #[must_use]
    pub fn to_log_config(&self) -> LogConfig {
        LogConfig {
            enabled: self.enabled,
            level: self.level.clone(),
            format: self.format,
            ansi: self.ansi,
            ..LogConfig::default()
        }
    }
}
