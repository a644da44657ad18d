//! Benchmark Result Aggregation
//!
//! Folds every run record found in a results directory into one time series
//! per benchmark case, and exposes the suite/group/case hierarchy used to
//! populate the window's tree.

use super::record::{RecordStore, RunRecord};
use crate::error::AggregatorError;
use crate::models::{suite_segments, BenchmarkTree, CaseId, DataPoint, Serie};
use std::collections::HashMap;
use std::path::Path;

/// Outcome of a directory scan
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Record files merged into the aggregator
    pub loaded: usize,
    /// Record files that could not be read or parsed
    pub skipped: usize,
    /// Data points added across all cases
    pub points: usize,
}

/// In-memory aggregation of all known run records
#[derive(Debug, Default)]
pub struct BenchmarkAggregator {
    tree: BenchmarkTree,
    ids: HashMap<(String, String), CaseId>,
    series: HashMap<CaseId, Serie>,
    next_id: u64,
}

impl BenchmarkAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget every case, serie and id assignment
    pub fn clear(&mut self) {
        self.tree = BenchmarkTree::new();
        self.ids.clear();
        self.series.clear();
        self.next_id = 0;
    }

    /// Merge every `*.json` record in `dir` (non-recursive).
    ///
    /// A missing directory is treated as "no results yet". Files that fail
    /// to load are skipped and counted in the report.
    pub fn scan_directory(&mut self, dir: &Path) -> Result<ScanReport, AggregatorError> {
        if dir.exists() && !dir.is_dir() {
            return Err(AggregatorError::NotADirectory(dir.to_path_buf()));
        }
        if !dir.exists() {
            log::warn!("[AGGREGATOR] Results directory does not exist: {}", dir.display());
            return Ok(ScanReport::default());
        }

        let store = RecordStore::new(dir);
        let paths = store.list()?;

        let mut report = ScanReport::default();
        for path in paths {
            match self.scan_file(&path) {
                Ok(points) => {
                    report.loaded += 1;
                    report.points += points;
                }
                Err(e) => {
                    log::warn!("[AGGREGATOR] Skipping {}: {}", path.display(), e);
                    report.skipped += 1;
                }
            }
        }

        log::info!(
            "[AGGREGATOR] Scanned {}: {} records loaded, {} skipped, {} cases",
            dir.display(),
            report.loaded,
            report.skipped,
            self.case_count()
        );
        Ok(report)
    }

    /// Merge a single record file. Returns the number of points added.
    pub fn scan_file(&mut self, path: &Path) -> Result<usize, AggregatorError> {
        let record = RecordStore::load(path)?;
        Ok(self.add_record(&record))
    }

    /// Merge an already-loaded record. Returns the number of points added.
    pub fn add_record(&mut self, record: &RunRecord) -> usize {
        let mut added = 0;
        for result in &record.results {
            if !result.ticks.is_finite() {
                log::debug!(
                    "[AGGREGATOR] Ignoring non-finite ticks for {}/{}",
                    result.suite,
                    result.case
                );
                continue;
            }
            let id = self.case_id(&result.suite, &result.case);
            self.series
                .entry(id)
                .or_default()
                .push(DataPoint::new(record.timestamp, result.ticks));
            added += 1;
        }
        added
    }

    /// Hierarchy of every known case
    pub fn benchmarks(&self) -> &BenchmarkTree {
        &self.tree
    }

    /// Time series of a case; `None` for ids this aggregator never issued
    pub fn serie(&self, id: CaseId) -> Option<&Serie> {
        self.series.get(&id)
    }

    /// Look up the id of a case by its suite and name
    pub fn find(&self, suite: &str, case: &str) -> Option<CaseId> {
        self.ids.get(&(normalize_suite(suite), case.to_string())).copied()
    }

    pub fn case_count(&self) -> usize {
        self.ids.len()
    }

    fn case_id(&mut self, suite: &str, case: &str) -> CaseId {
        let key = (normalize_suite(suite), case.to_string());
        if let Some(id) = self.ids.get(&key) {
            return *id;
        }
        let id = CaseId::new(self.next_id);
        self.next_id += 1;
        self.tree.insert(&key.0, &key.1, id);
        self.ids.insert(key, id);
        id
    }
}

fn normalize_suite(suite: &str) -> String {
    suite_segments(suite).collect::<Vec<_>>().join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::benchmark::record::{CaseResult, HostInfo};
    use chrono::{TimeZone, Utc};

    fn record(secs: i64, results: &[(&str, &str, f64)]) -> RunRecord {
        let ts = Utc.timestamp_opt(secs, 0).single().unwrap();
        let mut rec = RunRecord::new(ts, None, HostInfo::default());
        for (suite, case, ticks) in results {
            rec.results.push(CaseResult::new(*suite, *case, *ticks));
        }
        rec
    }

    #[test]
    fn test_same_case_shares_id_across_records() {
        let mut agg = BenchmarkAggregator::new();
        agg.add_record(&record(20, &[("math", "dot", 2.0)]));
        agg.add_record(&record(10, &[("math", "dot", 1.0)]));

        let id = agg.find("math", "dot").unwrap();
        let serie = agg.serie(id).unwrap();
        assert_eq!(serie.len(), 2);
        assert_eq!(serie.points()[0].ticks, 1.0);
        assert_eq!(agg.case_count(), 1);
    }

    #[test]
    fn test_suite_names_normalized() {
        let mut agg = BenchmarkAggregator::new();
        agg.add_record(&record(1, &[("storage/cache", "get", 1.0)]));
        agg.add_record(&record(2, &[("/storage//cache/", "get", 2.0)]));
        assert_eq!(agg.case_count(), 1);
    }

    #[test]
    fn test_non_finite_ticks_ignored() {
        let mut agg = BenchmarkAggregator::new();
        let added = agg.add_record(&record(1, &[("a", "nan", f64::NAN), ("a", "ok", 1.0)]));
        assert_eq!(added, 1);
        assert!(agg.find("a", "nan").is_none());
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut agg = BenchmarkAggregator::new();
        agg.add_record(&record(1, &[("a", "b", 1.0)]));
        agg.clear();
        assert_eq!(agg.case_count(), 0);
        assert!(agg.benchmarks().is_empty());
        assert!(agg.serie(CaseId::new(0)).is_none());
    }

    #[test]
    fn test_unknown_id_has_no_serie() {
        let agg = BenchmarkAggregator::new();
        assert!(agg.serie(CaseId::new(42)).is_none());
    }
}
