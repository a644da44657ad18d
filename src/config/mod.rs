//! Configuration module.
//!
//! `Settings` holds everything the window and the runner need at startup:
//! where run records live, how the panels are laid out, how many iterations a
//! case is timed for, and an optional external benchmark command.
//!
//! # Settings Management
//!
//! `SettingsManager` loads and saves `Settings` as pretty JSON:
//! - Missing file: defaults
//! - Malformed file: warning logged, defaults returned
//! - `BENCH_STUDIO_RESULTS_DIR` overrides `results_dir` after loading

pub mod loader;

use crate::benchmark::runner::RESULTS_DIR_ENV;
use crate::benchmark::MeasureConfig;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Persistent application settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory scanned for run records and written to by in-process runs
    pub results_dir: PathBuf,

    // Layout
    /// Initial width of the benchmark tree panel
    pub tree_panel_width: f32,
    /// Minimum width kept for the chart area
    pub chart_panel_min_width: f32,
    pub window_size: [f32; 2],

    // Runner
    pub warmup_iterations: u64,
    pub measure_iterations: u64,
    /// External benchmark program and arguments; in-process suites when empty
    pub runner_command: Vec<String>,
    /// Label stored in each new run record
    pub run_label: Option<String>,

    // Logging
    /// One of error, warn, info, debug, trace
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            results_dir: loader::default_results_dir(),
            tree_panel_width: 600.0,
            chart_panel_min_width: 300.0,
            window_size: [1000.0, 640.0],
            warmup_iterations: 100,
            measure_iterations: 1_000,
            runner_command: Vec::new(),
            run_label: None,
            log_level: "info".to_string(),
        }
    }
}

impl Settings {
    pub fn measure_config(&self) -> MeasureConfig {
        MeasureConfig {
            warmup_iterations: self.warmup_iterations,
            iterations: self.measure_iterations,
        }
    }

    /// Parsed log level, `Info` for unrecognized values
    pub fn log_level_filter(&self) -> log::LevelFilter {
        self.log_level
            .trim()
            .parse::<log::LevelFilter>()
            .unwrap_or(log::LevelFilter::Info)
    }

    pub fn uses_external_command(&self) -> bool {
        !self.runner_command.is_empty()
    }

    /// Reject values the UI or runner cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.results_dir.as_os_str().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "results_dir cannot be empty".to_string(),
            ));
        }
        if self.measure_iterations == 0 {
            return Err(ConfigError::ValidationFailed(
                "measure_iterations must be at least 1".to_string(),
            ));
        }
        if !(self.tree_panel_width > 0.0) || !(self.chart_panel_min_width > 0.0) {
            return Err(ConfigError::ValidationFailed(
                "panel widths must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Loads and persists [`Settings`]
pub struct SettingsManager;

impl SettingsManager {
    /// Load from `path`, or return defaults if the file is missing or
    /// cannot be parsed. Invalid values also fall back to defaults. The
    /// environment override is applied last.
    pub fn load_from(path: &Path) -> Settings {
        let mut settings = match loader::load_settings_from_file(path) {
            Ok(settings) => match settings.validate() {
                Ok(()) => settings,
                Err(e) => {
                    log::warn!("[Config] Invalid settings in {}, using defaults: {}", path.display(), e);
                    Settings::default()
                }
            },
            Err(ConfigError::FileNotFound(_)) => Settings::default(),
            Err(e) => {
                log::warn!("[Config] Failed to load {}, using defaults: {}", path.display(), e);
                Settings::default()
            }
        };

        if let Some(dir) = std::env::var_os(RESULTS_DIR_ENV) {
            if !dir.is_empty() {
                settings.results_dir = PathBuf::from(dir);
            }
        }

        settings
    }

    pub fn save_to(settings: &Settings, path: &Path) -> Result<(), ConfigError> {
        settings.validate()?;
        loader::save_settings_to_file(settings, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout_matches_splitter() {
        let settings = Settings::default();
        assert_eq!(settings.tree_panel_width, 600.0);
        assert_eq!(settings.chart_panel_min_width, 300.0);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_log_level_filter() {
        let mut settings = Settings::default();
        settings.log_level = "debug".to_string();
        assert_eq!(settings.log_level_filter(), log::LevelFilter::Debug);
        settings.log_level = "chatty".to_string();
        assert_eq!(settings.log_level_filter(), log::LevelFilter::Info);
    }

    #[test]
    fn test_validate_rejects_zero_iterations() {
        let mut settings = Settings::default();
        settings.measure_iterations = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_results_dir_env_override() {
        // Same variable the runner exports to external benchmark commands
        let dir = tempfile::tempdir().unwrap();
        std::env::set_var(RESULTS_DIR_ENV, dir.path());
        let settings = SettingsManager::load_from(&dir.path().join("settings.json"));
        std::env::remove_var(RESULTS_DIR_ENV);
        assert_eq!(settings.results_dir, dir.path());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"measure_iterations": 5}"#).unwrap();
        assert_eq!(settings.measure_iterations, 5);
        assert_eq!(settings.tree_panel_width, 600.0);
        assert!(settings.runner_command.is_empty());
    }
}
