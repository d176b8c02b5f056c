//! Layered configuration loader.
//!
//! Layers apply in order, later ones overriding earlier ones: defaults, a
//! configuration file (TOML or JSON), then environment variables.

use std::env;
use std::fs;
use std::path::Path;

use accord_telemetry::LogFormat;

use crate::{AccordConfig, ConfigError};

/// Configuration loader.
///
/// ```no_run
/// use accord_config::ConfigLoader;
///
/// # fn main() -> Result<(), accord_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_optional_file("accord.toml")?
///     .with_dotenv()
///     .with_env_prefix("ACCORD")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ConfigLoader {
    config: AccordConfig,
    env_prefix: Option<String>,
}

impl ConfigLoader {
    /// A loader starting from [`AccordConfig::default`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from the development preset.
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = AccordConfig::development();
        self
    }

    /// Starts from the production preset.
    #[must_use]
    pub fn with_production(mut self) -> Self {
        self.config = AccordConfig::production();
        self
    }

    /// Loads a `.toml` or `.json` file; the extension picks the format.
    ///
    /// The file replaces the current configuration. Sections and fields it
    /// leaves out take their defaults.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;
        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();

        self.config = parse(&content, format)?;
        tracing::debug!(path = %path.display(), "configuration file loaded");
        Ok(self)
    }

    /// Like [`with_file`](Self::with_file), but a missing file is skipped.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Loads configuration from a string in `format` (`"toml"` or `"json"`).
    ///
    /// ```
    /// use accord_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string("[server]\nhttp_addr = \"127.0.0.1:3000\"", "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.server.http_addr, "127.0.0.1:3000");
    /// assert!(config.docs.enabled);
    /// ```
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        self.config = parse(content, format)?;
        Ok(self)
    }

    /// Sets the prefix for environment overrides.
    ///
    /// Variables take the form `PREFIX__SECTION__KEY`, for example
    /// `ACCORD__SERVER__HTTP_ADDR=0.0.0.0:9000`. They are read by
    /// [`load`](Self::load).
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Loads `.env` from the working directory or its parents, if present.
    #[must_use]
    pub fn with_dotenv(self) -> Self {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "environment file loaded");
        }
        self
    }

    /// Loads a specific environment file.
    ///
    /// Variables already set in the process are not overwritten.
    pub fn with_dotenv_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        dotenvy::from_path(path.as_ref())?;
        Ok(self)
    }

    /// Applies environment overrides and validates.
    pub fn load(mut self) -> Result<AccordConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            self.apply_env_overrides(&prefix)?;
        }
        self.config.validate()?;
        Ok(self.config)
    }

    /// Returns the configuration without env overrides or validation.
    #[must_use]
    pub fn load_unvalidated(self) -> AccordConfig {
        self.config
    }

    fn apply_env_overrides(&mut self, prefix: &str) -> Result<(), ConfigError> {
        let marker = format!("{prefix}__");
        let mut vars: Vec<(String, String)> = env::vars()
            .filter(|(key, _)| key.starts_with(&marker))
            .collect();
        vars.sort();

        for (key, value) in vars {
            let path = &key[marker.len()..];
            self.apply_env_var(&key, path, &value)?;
        }
        Ok(())
    }

    fn apply_env_var(&mut self, key: &str, path: &str, value: &str) -> Result<(), ConfigError> {
        let parts: Vec<&str> = path.split("__").collect();
        let config = &mut self.config;

        match parts.as_slice() {
            ["SERVER", "HTTP_ADDR"] => config.server.http_addr = value.to_string(),
            ["SERVER", "SHUTDOWN_TIMEOUT_SECS"] => {
                config.server.shutdown_timeout_secs = parse_number(key, value)?;
            }
            ["SERVER", "REQUEST_TIMEOUT_SECS"] => {
                config.server.request_timeout_secs = parse_number(key, value)?;
            }
            ["SERVER", "MAX_BODY_SIZE"] => {
                config.server.max_body_size = parse_number(key, value)?;
            }
            ["SERVER", "KEEP_ALIVE"] => config.server.keep_alive = parse_bool(key, value)?,

            ["DOCS", "ENABLED"] => config.docs.enabled = parse_bool(key, value)?,
            ["DOCS", "JSON_PATH"] => config.docs.json_path = value.to_string(),
            ["DOCS", "UI_PATH"] => config.docs.ui_path = value.to_string(),
            ["DOCS", "TITLE"] => config.docs.title = non_empty(value),
            ["DOCS", "VERSION"] => config.docs.version = non_empty(value),

            ["VALIDATION", "VALIDATE_RESPONSES"] => {
                config.validation.validate_responses = parse_bool(key, value)?;
            }
            ["VALIDATION", "SKIP_RESPONSE_VALIDATION_FOR_STATUS"] => {
                config.validation.skip_response_validation_for_status = value
                    .split(',')
                    .map(str::trim)
                    .filter(|status| !status.is_empty())
                    .map(|status| parse_number(key, status))
                    .collect::<Result<_, _>>()?;
            }

            ["LOGGING", "ENABLED"] => config.logging.enabled = parse_bool(key, value)?,
            ["LOGGING", "LEVEL"] => config.logging.level = value.to_string(),
            ["LOGGING", "FORMAT"] => {
                config.logging.format = match value.to_lowercase().as_str() {
                    "json" => LogFormat::Json,
                    "pretty" => LogFormat::Pretty,
                    "compact" => LogFormat::Compact,
                    _ => {
                        return Err(ConfigError::env_parse_error(
                            key,
                            "expected 'json', 'pretty' or 'compact'",
                        ))
                    }
                };
            }
            ["LOGGING", "ANSI"] => config.logging.ansi = parse_bool(key, value)?,

            _ => tracing::warn!(var = %key, "ignoring unknown configuration variable"),
        }

        Ok(())
    }
}

fn parse(content: &str, format: &str) -> Result<AccordConfig, ConfigError> {
    match format.to_lowercase().as_str() {
        "toml" => Ok(toml::from_str(content)?),
        "json" => Ok(serde_json::from_str(content)?),
        other => Err(ConfigError::UnsupportedFormat(other.to_string())),
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::env_parse_error(key, "expected integer"))
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::env_parse_error(key, "expected boolean")),
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loader_defaults() {
        let config = ConfigLoader::new().load().unwrap();
        assert_eq!(config, AccordConfig::default());
    }

    #[test]
    fn test_with_string_json() {
        let config = ConfigLoader::new()
            .with_string(r#"{"validation": {"validate_responses": false}}"#, "json")
            .unwrap()
            .load()
            .unwrap();
        assert!(!config.validation.validate_responses);
        assert_eq!(config.server.http_addr, "0.0.0.0:8080");
    }

    #[test]
    fn test_unsupported_format() {
        let result = ConfigLoader::new().with_string("", "yaml");
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(f)) if f == "yaml"));
    }

    #[test]
    fn test_unknown_section_rejected() {
        let result = ConfigLoader::new().with_string("[metrics]\nenabled = true", "toml");
        assert!(matches!(result, Err(ConfigError::TomlError(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = ConfigLoader::new().with_file("/nonexistent/accord.toml");
        assert!(matches!(result, Err(ConfigError::FileNotFound { .. })));
    }

    #[test]
    fn test_optional_missing_file() {
        let config = ConfigLoader::new()
            .with_optional_file("/nonexistent/accord.toml")
            .unwrap()
            .load()
            .unwrap();
        assert_eq!(config, AccordConfig::default());
    }

    #[test]
    fn test_env_overrides() {
        env::set_var("ACCORD_UNIT_ENV__SERVER__HTTP_ADDR", "127.0.0.1:9100");
        env::set_var("ACCORD_UNIT_ENV__SERVER__MAX_BODY_SIZE", "2048");
        env::set_var("ACCORD_UNIT_ENV__DOCS__TITLE", "Inventory");
        env::set_var(
            "ACCORD_UNIT_ENV__VALIDATION__SKIP_RESPONSE_VALIDATION_FOR_STATUS",
            "404, 500",
        );
        env::set_var("ACCORD_UNIT_ENV__LOGGING__FORMAT", "compact");

        let config = ConfigLoader::new()
            .with_env_prefix("accord_unit_env")
            .load()
            .unwrap();

        assert_eq!(config.server.http_addr, "127.0.0.1:9100");
        assert_eq!(config.server.max_body_size, 2048);
        assert_eq!(config.docs.title.as_deref(), Some("Inventory"));
        assert_eq!(
            config.validation.skip_response_validation_for_status,
            vec![404, 500]
        );
        assert_eq!(config.logging.format, LogFormat::Compact);
    }

    #[test]
    fn test_env_parse_failure() {
        env::set_var("ACCORD_UNIT_BAD__SERVER__KEEP_ALIVE", "maybe");
        let result = ConfigLoader::new().with_env_prefix("ACCORD_UNIT_BAD").load();
        assert!(matches!(
            result,
            Err(ConfigError::EnvParseError { var, .. }) if var == "ACCORD_UNIT_BAD__SERVER__KEEP_ALIVE"
        ));
    }

    #[test]
    fn test_env_override_is_validated() {
        env::set_var("ACCORD_UNIT_INVALID__DOCS__JSON_PATH", "openapi.json");
        let result = ConfigLoader::new()
            .with_env_prefix("ACCORD_UNIT_INVALID")
            .load();
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("K", "on").unwrap());
        assert!(!parse_bool("K", "0").unwrap());
        assert!(parse_bool("K", "maybe").is_err());
    }
}
