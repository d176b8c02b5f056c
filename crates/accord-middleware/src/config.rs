//! Process-wide validation settings.
//!
//! The active [`ValidationConfig`] is an immutable snapshot behind a
//! read-mostly lock. [`configure`] merges a [`ConfigPatch`] into a new
//! snapshot and swaps it in; in-flight requests keep the snapshot they
//! started with. [`reset_config`] restores the defaults.
//!
//! ```
//! use accord_middleware::{configure, current_config, reset_config, ConfigPatch};
//!
//! configure(ConfigPatch::new().validate_responses(false));
//! assert!(!current_config().validate_responses());
//!
//! reset_config();
//! assert!(current_config().validate_responses());
//! ```

use std::collections::BTreeSet;
use std::fmt;
use std::sync::{Arc, LazyLock};

use http::StatusCode;
use parking_lot::RwLock;
use serde_json::Value;

use crate::error::{default_error_body, ErrorContext, ErrorFormatter};

/// Statuses exempt from single-schema response validation by default.
pub const DEFAULT_SKIPPED_STATUSES: [u16; 9] = [400, 401, 403, 404, 409, 422, 500, 502, 503];

static GLOBAL: LazyLock<RwLock<Arc<ValidationConfig>>> =
    LazyLock::new(|| RwLock::new(Arc::new(ValidationConfig::default())));

/// Validation settings.
#[derive(Clone)]
pub struct ValidationConfig {
    format_error: Option<ErrorFormatter>,
    validate_responses: bool,
    skip_response_validation_for_status: BTreeSet<u16>,
}

impl ValidationConfig {
    /// Replaces the error formatter.
    #[must_use]
    pub fn with_error_formatter<F>(mut self, formatter: F) -> Self
    where
        F: Fn(&ErrorContext<'_>) -> Value + Send + Sync + 'static,
    {
        self.format_error = Some(Arc::new(formatter));
        self
    }

    /// Enables or disables response validation.
    #[must_use]
    pub fn with_validate_responses(mut self, enabled: bool) -> Self {
        self.validate_responses = enabled;
        self
    }

    /// Replaces the set of statuses exempt from response validation.
    #[must_use]
    pub fn with_skipped_statuses<I: IntoIterator<Item = u16>>(mut self, statuses: I) -> Self {
        self.skip_response_validation_for_status = statuses.into_iter().collect();
        self
    }

    /// Whether replies are validated at all.
    pub fn validate_responses(&self) -> bool {
        self.validate_responses
    }

    /// Statuses exempt from response validation.
    pub fn skipped_statuses(&self) -> &BTreeSet<u16> {
        &self.skip_response_validation_for_status
    }

    /// Whether `status` is exempt from response validation.
    pub fn is_skipped(&self, status: StatusCode) -> bool {
        self.skip_response_validation_for_status
            .contains(&status.as_u16())
    }

    /// Formats a failure with the configured formatter.
    pub fn format_error(&self, ctx: &ErrorContext<'_>) -> Value {
        match &self.format_error {
            Some(formatter) => formatter(ctx),
            None => default_error_body(ctx),
        }
    }

    /// Returns a copy with every field set in `patch` replaced.
    #[must_use]
    pub fn merge(&self, patch: ConfigPatch) -> Self {
        let mut merged = self.clone();
        if let Some(formatter) = patch.format_error {
            merged.format_error = Some(formatter);
        }
        if let Some(enabled) = patch.validate_responses {
            merged.validate_responses = enabled;
        }
        if let Some(statuses) = patch.skip_response_validation_for_status {
            merged.skip_response_validation_for_status = statuses.into_iter().collect();
        }
        merged
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            format_error: None,
            validate_responses: true,
            skip_response_validation_for_status: DEFAULT_SKIPPED_STATUSES.into_iter().collect(),
        }
    }
}

impl fmt::Debug for ValidationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationConfig")
            .field("custom_formatter", &self.format_error.is_some())
            .field("validate_responses", &self.validate_responses)
            .field(
                "skip_response_validation_for_status",
                &self.skip_response_validation_for_status,
            )
            .finish()
    }
}

/// A partial update for [`ValidationConfig`]; unset fields are kept.
#[derive(Clone, Default)]
pub struct ConfigPatch {
    format_error: Option<ErrorFormatter>,
    validate_responses: Option<bool>,
    skip_response_validation_for_status: Option<Vec<u16>>,
}

impl ConfigPatch {
    /// An empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the error formatter.
    #[must_use]
    pub fn format_error<F>(mut self, formatter: F) -> Self
    where
        F: Fn(&ErrorContext<'_>) -> Value + Send + Sync + 'static,
    {
        self.format_error = Some(Arc::new(formatter));
        self
    }

    /// Sets the response validation switch.
    #[must_use]
    pub fn validate_responses(mut self, enabled: bool) -> Self {
        self.validate_responses = Some(enabled);
        self
    }

    /// Sets the exempt statuses.
    #[must_use]
    pub fn skip_response_validation_for_status<I: IntoIterator<Item = u16>>(
        mut self,
        statuses: I,
    ) -> Self {
        self.skip_response_validation_for_status = Some(statuses.into_iter().collect());
        self
    }

    /// `true` when the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.format_error.is_none()
            && self.validate_responses.is_none()
            && self.skip_response_validation_for_status.is_none()
    }
}

impl fmt::Debug for ConfigPatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigPatch")
            .field("format_error", &self.format_error.is_some())
            .field("validate_responses", &self.validate_responses)
            .field(
                "skip_response_validation_for_status",
                &self.skip_response_validation_for_status,
            )
            .finish()
    }
}

/// Merges `patch` into the process-wide configuration.
pub fn configure(patch: ConfigPatch) {
    let mut global = GLOBAL.write();
    let merged = global.merge(patch);
    tracing::debug!(config = ?merged, "validation config updated");
    *global = Arc::new(merged);
}

/// Restores the process-wide configuration to its defaults.
pub fn reset_config() {
    *GLOBAL.write() = Arc::new(ValidationConfig::default());
}

/// The current process-wide configuration snapshot.
pub fn current_config() -> Arc<ValidationConfig> {
    Arc::clone(&GLOBAL.read())
}

/// Where a stage reads its configuration from.
#[derive(Debug, Clone, Default)]
pub enum ConfigSource {
    /// The process-wide configuration, read per request.
    #[default]
    Global,
    /// A configuration injected at construction.
    Fixed(Arc<ValidationConfig>),
}

impl ConfigSource {
    /// Returns the configuration snapshot to use for one request.
    pub fn load(&self) -> Arc<ValidationConfig> {
        match self {
            Self::Global => current_config(),
            Self::Fixed(config) => Arc::clone(config),
        }
    }
}

impl From<ValidationConfig> for ConfigSource {
    fn from(config: ValidationConfig) -> Self {
        Self::Fixed(Arc::new(config))
    }
}
