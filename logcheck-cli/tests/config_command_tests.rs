//! Integration tests for configuration handling used by `logcheck config` and `logcheck scan`.
//!
//! Exercises loading real TOML files and turning them into scan rules.

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use logcheck_core::config::LogCheckConfig;
use logcheck_scanner::{LogFileRule, RuleConfig, RuleConfigBuilder};

fn sample_resources() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../crates/log-scanner/tests/resources")
}

#[tokio::test]
async fn test_config_validate_valid_toml() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("logcheck.toml");

    let valid_config = r#"
[general]
log_level = "debug"
log_format = "json"

[scan]
file_names = ["error.log", "request.log"]
stop_at_error = false
known_issues = ["LuceneSearchCollection Error executing doUpdate"]

[wait]
poll_interval_ms = 250
max_wait_ms = 5000
"#;
    fs::write(&config_path, valid_config).expect("should write config");

    let config = LogCheckConfig::load(&config_path)
        .await
        .expect("valid config should load");
    assert_eq!(config.scan.file_names, vec!["error.log", "request.log"]);
    assert!(!config.scan.stop_at_error);
    assert_eq!(config.wait.max_wait_ms, 5000);
}

#[tokio::test]
async fn test_config_validate_malformed_toml() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("bad.toml");
    fs::write(&config_path, "[scan\nstop_at_error = false\n").expect("should write bad config");

    let result = LogCheckConfig::load(&config_path).await;
    assert!(result.is_err(), "malformed TOML should fail to load");
}

#[tokio::test]
async fn test_config_validate_rejects_bad_log_level() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("logcheck.toml");
    fs::write(&config_path, "[general]\nlog_level = \"verbose\"\n").expect("write");

    let err = LogCheckConfig::load(&config_path)
        .await
        .expect_err("unknown log level should be rejected");
    assert!(err.is_config());
}

#[tokio::test]
async fn test_missing_config_file_uses_defaults() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("absent.toml");

    let config = LogCheckConfig::load_or_default(&config_path)
        .await
        .expect("absent file should fall back to defaults");
    assert_eq!(RuleConfig::from_core(&config), RuleConfig::default());

    assert!(
        LogCheckConfig::load(&config_path).await.is_err(),
        "strict load should still report the missing file"
    );
}

#[tokio::test]
async fn test_loaded_config_drives_scan() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("logcheck.toml");
    let config_toml = format!(
        "[scan]\nstop_at_error = false\nread_log_file_from_test_resources = true\ntest_resources_dir = \"{}\"\n",
        sample_resources().display().to_string().replace('\\', "/")
    );
    fs::write(&config_path, config_toml).expect("write");

    let config = LogCheckConfig::load(&config_path).await.expect("load");
    let rule_config = RuleConfigBuilder::from_config(RuleConfig::from_core(&config))
        .build()
        .expect("valid rule config");

    let errors = tokio::task::spawn_blocking(move || {
        let mut rule = LogFileRule::new(Some(rule_config));
        rule.run(|rule| rule.errors().len())
    })
    .await
    .expect("task should not panic")
    .expect("scan should succeed");

    assert_eq!(errors, 4);
}
