//! Run Record Persistence
//!
//! Every benchmark run is stored as one pretty-printed JSON file named
//! `run_<unix-millis>.json` inside the results directory. A record carries the
//! run timestamp, an optional label, a snapshot of the host, and one entry per
//! executed case.

use crate::error::RecordError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Filename prefix shared by all run records
pub const RECORD_PREFIX: &str = "run_";
/// Filename extension of run records
pub const RECORD_EXTENSION: &str = "json";

/// Machine the run executed on
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostInfo {
    pub hostname: String,
    pub cpu_brand: String,
    pub cpu_count: usize,
    pub os: String,
}

impl HostInfo {
    /// Snapshot the current machine via sysinfo
    pub fn detect() -> Self {
        use sysinfo::System;

        let mut sys = System::new();
        sys.refresh_cpu_all();

        let cpu_brand = sys
            .cpus()
            .first()
            .map(|cpu| cpu.brand().trim().to_string())
            .unwrap_or_default();

        HostInfo {
            hostname: System::host_name().unwrap_or_else(|| "unknown".to_string()),
            cpu_brand,
            cpu_count: sys.cpus().len(),
            os: System::long_os_version().unwrap_or_else(|| std::env::consts::OS.to_string()),
        }
    }
}

/// Outcome of one benchmark case within a run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CaseResult {
    pub suite: String,
    pub case: String,
    /// Mean nanoseconds per iteration
    pub ticks: f64,
    #[serde(default)]
    pub iterations: u64,
    #[serde(default)]
    pub p50: Option<f64>,
    #[serde(default)]
    pub p99: Option<f64>,
}

impl CaseResult {
    pub fn new(suite: impl Into<String>, case: impl Into<String>, ticks: f64) -> Self {
        CaseResult {
            suite: suite.into(),
            case: case.into(),
            ticks,
            iterations: 0,
            p50: None,
            p99: None,
        }
    }
}

/// A complete benchmark run as persisted on disk
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub host: HostInfo,
    #[serde(default)]
    pub results: Vec<CaseResult>,
}

impl RunRecord {
    pub fn new(timestamp: DateTime<Utc>, label: Option<String>, host: HostInfo) -> Self {
        RunRecord {
            timestamp,
            label,
            host,
            results: Vec::new(),
        }
    }

    /// Filename for this record, derived from its timestamp
    pub fn file_name(&self) -> String {
        format!(
            "{}{}.{}",
            RECORD_PREFIX,
            self.timestamp.timestamp_millis(),
            RECORD_EXTENSION
        )
    }
}

/// Whether `path` looks like a run record (`*.json`)
pub fn is_record_path(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case(RECORD_EXTENSION))
            .unwrap_or(false)
}

/// Reads and writes run records within one results directory
#[derive(Clone, Debug)]
pub struct RecordStore {
    dir: PathBuf,
}

impl RecordStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        RecordStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persist `record`, creating the directory if needed. Returns the path
    /// written. A record with the same millisecond timestamp is overwritten.
    pub fn save(&self, record: &RunRecord) -> Result<PathBuf, RecordError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(record.file_name());
        let json = serde_json::to_string_pretty(record)?;
        fs::write(&path, json)?;
        log::info!(
            "[RECORD] Saved run record {} ({} results)",
            path.display(),
            record.results.len()
        );
        Ok(path)
    }

    /// Load one record from an arbitrary path
    pub fn load(path: &Path) -> Result<RunRecord, RecordError> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                RecordError::NotFound(path.to_path_buf())
            } else {
                RecordError::IoError(e)
            }
        })?;
        serde_json::from_str(&content).map_err(|source| RecordError::InvalidJson {
            path: path.to_path_buf(),
            source,
        })
    }

    /// All record files in the directory, sorted by filename. A missing
    /// directory yields an empty list.
    pub fn list(&self) -> Result<Vec<PathBuf>, RecordError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let mut paths = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if is_record_path(&path) {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }
}
