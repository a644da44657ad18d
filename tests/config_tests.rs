//! Settings persistence tests
//!
//! Covers the fallback rules of `SettingsManager::load_from`: missing and
//! malformed files give defaults, partial files keep defaults for absent keys.

use bench_studio::config::loader::{load_settings_from_file, save_settings_to_file};
use bench_studio::config::{Settings, SettingsManager};
use bench_studio::error::ConfigError;
use std::fs;
use std::path::PathBuf;

#[test]
fn test_missing_file_gives_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let settings = SettingsManager::load_from(&dir.path().join("settings.json"));

    assert_eq!(settings.tree_panel_width, 600.0);
    assert_eq!(settings.chart_panel_min_width, 300.0);
    assert!(settings.runner_command.is_empty());
}

#[test]
fn test_malformed_file_gives_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    fs::write(&path, "{ \"tree_panel_width\": ").unwrap();

    let settings = SettingsManager::load_from(&path);
    assert_eq!(settings.tree_panel_width, Settings::default().tree_panel_width);

    assert!(matches!(
        load_settings_from_file(&path),
        Err(ConfigError::InvalidJson(_))
    ));
}

#[test]
fn test_partial_file_keeps_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    fs::write(&path, r#"{ "measure_iterations": 42, "log_level": "debug" }"#).unwrap();

    let settings = load_settings_from_file(&path).unwrap();
    assert_eq!(settings.measure_iterations, 42);
    assert_eq!(settings.log_level, "debug");
    assert_eq!(settings.warmup_iterations, 100);
    assert_eq!(settings.window_size, [1000.0, 640.0]);
}

#[test]
fn test_invalid_values_fall_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    fs::write(&path, r#"{ "measure_iterations": 0 }"#).unwrap();

    let settings = SettingsManager::load_from(&path);
    assert_eq!(settings.measure_iterations, 1_000);
}

#[test]
fn test_save_then_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("settings.json");

    let settings = Settings {
        results_dir: PathBuf::from("/srv/bench"),
        runner_command: vec!["./bench".to_string(), "--all".to_string()],
        run_label: Some("nightly".to_string()),
        ..Settings::default()
    };
    SettingsManager::save_to(&settings, &path).unwrap();

    let loaded = load_settings_from_file(&path).unwrap();
    assert_eq!(loaded, settings);
    assert!(loaded.uses_external_command());
}

#[test]
fn test_non_json_path_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.toml");

    let result = save_settings_to_file(&Settings::default(), &path);
    assert!(matches!(result, Err(ConfigError::ValidationFailed(_))));
    assert!(!path.exists());
}
