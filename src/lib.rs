//! Bench Studio
//!
//! Desktop browser for recorded benchmark results. Scans a directory of run
//! records, shows every benchmark case in a tree, charts the timing history of
//! the selected case, and re-runs the benchmark suite on a background thread.
//!
//! The crate is organized into functional modules:
//! - **error**: Unified error type hierarchy
//! - **models**: Case ids, data points, series and the case tree
//! - **benchmark**: Run records, aggregation, timing, suites and the runner
//! - **config**: Settings persistence
//! - **log_collector**: `log` backend writing to disk and the UI
//! - **ui**: Window controller and egui rendering

pub mod benchmark;
pub mod config;
pub mod error;
pub mod log_collector;
pub mod models;
pub mod ui;

pub use log_collector::{LogCollector, LogLine};

// ============================================================================
// PUBLIC RE-EXPORTS FOR CONVENIENCE
// ============================================================================

pub use error::{AggregatorError, AppError, ConfigError, RecordError, Result, RunnerError};

pub use models::{BenchmarkTree, CaseId, DataPoint, Serie};

pub use benchmark::{BenchmarkAggregator, BenchmarkRunner, RunnerEvent, RunnerThread};

pub use config::{Settings, SettingsManager};

pub use ui::{BenchmarkController, BenchmarkWindow};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
