use std::fs;

use anyhow::Result;
use patchdeck_telemetry::{
    LOG_DIR_NAME, LogFormat, LogView, LoggingConfig, TelemetryError, init_logging,
};

#[test]
fn session_log_file_receives_events_and_second_install_fails() -> Result<()> {
    let home = tempfile::tempdir()?;
    let path = home.path().join(LOG_DIR_NAME).join("patchdeck_test.log");
    let config = LoggingConfig {
        level: "info",
        format: LogFormat::Pretty,
        log_file: Some(&path),
    };
    init_logging(&config)?;

    tracing::info!(answer = 42, "application started");
    let mut view = LogView::new();
    view.push("Dropped file: app.apk");

    let contents = fs::read_to_string(&path)?;
    assert!(contents.contains("application started"));
    assert!(contents.contains("answer=42"));
    assert!(contents.contains("Dropped file: app.apk"));

    let second = init_logging(&LoggingConfig::default());
    assert!(matches!(
        second,
        Err(TelemetryError::SubscriberInstall { .. })
    ));
    Ok(())
}
