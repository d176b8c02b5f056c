//! Installing the global subscriber.

use accord_telemetry::{init_logging, LogConfig, LogFormat, TelemetryError};

#[test]
fn second_initialization_is_rejected() {
    let config = LogConfig {
        format: LogFormat::Compact,
        level: "warn".to_string(),
        ..LogConfig::default()
    };

    init_logging(&config).unwrap();
    tracing::warn!("subscriber installed");

    assert!(matches!(
        init_logging(&LogConfig::default()),
        Err(TelemetryError::AlreadyInitialized(_))
    ));
}
