//! Tests for config file loading and graceful degradation
//!
//! - Missing TOML files do not cause termination
//! - An explicit config path must exist and parse
//! - Platform config location is honored
//! - A missing platform config file is reported with a warning
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Tests that manipulate XDG_CONFIG_HOME are marked with #[serial].

use appraise_common::config::{ConfigOverrides, ServiceConfig, SweepPolicy, TomlConfig};
use appraise_common::Error;
use serial_test::serial;
use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[test]
fn test_load_full_toml_file() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = temp_dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
predictor_url = "http://scoring.internal:8080"
request_timeout_ms = 2500
host = "0.0.0.0"
port = 9100
log_level = "debug"
sweep_policy = "best_effort"
reference_square_footages = [800.0, 1600.0, 2400.0]
"#,
    )
    .expect("Failed to write config");

    let (toml, loaded_from) = TomlConfig::load_or_default(Some(&path)).unwrap();
    assert_eq!(loaded_from.as_deref(), Some(path.as_path()));

    let config = ServiceConfig::resolve(&ConfigOverrides::default(), &toml).unwrap();
    assert_eq!(config.predictor_url, "http://scoring.internal:8080");
    assert_eq!(config.request_timeout, Duration::from_millis(2500));
    assert_eq!(config.bind_address(), "0.0.0.0:9100");
    assert_eq!(config.log_level, "debug");
    assert_eq!(config.sweep_policy, SweepPolicy::BestEffort);
    assert_eq!(config.reference_square_footages, vec![800.0, 1600.0, 2400.0]);
}

#[test]
fn test_partial_toml_falls_back_to_defaults() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = temp_dir.path().join("config.toml");
    std::fs::write(&path, "port = 7001\n").expect("Failed to write config");

    let (toml, _) = TomlConfig::load_or_default(Some(&path)).unwrap();
    let config = ServiceConfig::resolve(&ConfigOverrides::default(), &toml).unwrap();

    let defaults = ServiceConfig::default();
    assert_eq!(config.port, 7001);
    assert_eq!(config.predictor_url, defaults.predictor_url);
    assert_eq!(config.sweep_policy, SweepPolicy::AllOrNothing);
}

#[test]
fn test_explicit_missing_file_is_error() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = temp_dir.path().join("does-not-exist.toml");

    let result = TomlConfig::load_or_default(Some(&path));
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn test_malformed_file_is_config_error() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = temp_dir.path().join("config.toml");
    std::fs::write(&path, "port = \"not a number\"\n").expect("Failed to write config");

    let result = TomlConfig::load(&path);
    assert!(matches!(result, Err(Error::Config(_))));
}

#[cfg(target_os = "linux")]
#[test]
#[serial]
fn test_platform_config_dir_is_used() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let app_dir = temp_dir.path().join("appraise");
    std::fs::create_dir_all(&app_dir).expect("Failed to create config dir");
    std::fs::write(app_dir.join("config.toml"), "log_level = \"warn\"\n")
        .expect("Failed to write config");

    let previous = std::env::var("XDG_CONFIG_HOME").ok();
    std::env::set_var("XDG_CONFIG_HOME", temp_dir.path());

    let result = TomlConfig::load_or_default(None);

    match previous {
        Some(value) => std::env::set_var("XDG_CONFIG_HOME", value),
        None => std::env::remove_var("XDG_CONFIG_HOME"),
    }

    let (toml, loaded_from) = result.unwrap();
    assert_eq!(toml.log_level.as_deref(), Some("warn"));
    assert_eq!(loaded_from, Some(app_dir.join("config.toml")));
}

#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[cfg(target_os = "linux")]
#[test]
#[serial]
fn test_missing_platform_config_logs_warning() {
    if std::path::Path::new("/etc/appraise/config.toml").exists() {
        return;
    }

    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let previous = std::env::var("XDG_CONFIG_HOME").ok();
    std::env::set_var("XDG_CONFIG_HOME", temp_dir.path());

    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_writer(move || writer.clone())
        .finish();
    let result = tracing::subscriber::with_default(subscriber, || {
        TomlConfig::load_or_default(None)
    });

    match previous {
        Some(value) => std::env::set_var("XDG_CONFIG_HOME", value),
        None => std::env::remove_var("XDG_CONFIG_HOME"),
    }

    let (toml, loaded_from) = result.unwrap();
    assert_eq!(toml, TomlConfig::default());
    assert_eq!(loaded_from, None);

    let output = String::from_utf8_lossy(&logs.0.lock().unwrap()).into_owned();
    assert!(output.contains("WARN"));
    assert!(output.contains("No config file found, using defaults"));
}
