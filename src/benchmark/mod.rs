//! Benchmark discovery, execution and result aggregation.
//!
//! - `record`: on-disk run record format and store
//! - `aggregator`: merges run records into per-case time series
//! - `measure`: per-case timing with hdrhistogram
//! - `suites`: built-in benchmark cases
//! - `runner`: background execution and completion events

pub mod aggregator;
pub mod measure;
pub mod record;
pub mod runner;
pub mod suites;

pub use aggregator::{BenchmarkAggregator, ScanReport};
pub use measure::{measure, MeasureConfig, Measurement};
pub use record::{CaseResult, HostInfo, RecordStore, RunRecord};
pub use runner::{
    BenchmarkRunner, CommandExecutor, EventSink, InProcessExecutor, RunSummary, RunnerEvent,
    RunnerThread, SuiteExecutor,
};
pub use suites::{BenchmarkCase, SuiteRegistry};
