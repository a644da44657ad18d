//! Results directory aggregation tests
//!
//! Writes run records with `RecordStore` into a temporary directory and checks
//! what `BenchmarkAggregator` builds from them.

use bench_studio::benchmark::{BenchmarkAggregator, CaseResult, HostInfo, RecordStore, RunRecord};
use bench_studio::error::AggregatorError;
use bench_studio::ui::tree::{build_tree_nodes, node_count};
use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use std::fs;
use std::path::Path;

fn write_run(dir: &Path, secs: i64, results: &[(&str, &str, f64)]) {
    let ts = Utc.timestamp_opt(secs, 0).single().unwrap();
    let mut record = RunRecord::new(ts, Some(format!("run {}", secs)), HostInfo::default());
    for (suite, case, ticks) in results {
        record.results.push(CaseResult::new(*suite, *case, *ticks));
    }
    RecordStore::new(dir).save(&record).unwrap();
}

#[test]
fn test_nested_suites_become_groups() {
    let dir = tempfile::tempdir().unwrap();
    write_run(
        dir.path(),
        100,
        &[
            ("foundation/containers", "vec_push", 4.0),
            ("foundation/math", "dot", 2.0),
            ("algorithms", "sort", 9.0),
        ],
    );

    let mut aggregator = BenchmarkAggregator::new();
    let report = aggregator.scan_directory(dir.path()).unwrap();
    assert_eq!(report.loaded, 1);
    assert_eq!(report.points, 3);

    let tree = aggregator.benchmarks();
    assert_eq!(tree.case_count(), 3);
    let foundation = &tree.groups["foundation"];
    assert!(foundation.groups.contains_key("containers"));
    assert!(foundation.groups.contains_key("math"));
    assert!(tree.groups["algorithms"].cases.contains_key("sort"));

    // 2 top groups + 2 subgroups + 3 cases
    assert_eq!(node_count(&build_tree_nodes(tree)), 7);
}

#[test]
fn test_series_ordered_by_date_across_files() {
    let dir = tempfile::tempdir().unwrap();
    write_run(dir.path(), 3_000, &[("math", "dot", 3.0)]);
    write_run(dir.path(), 1_000, &[("math", "dot", 1.0)]);
    write_run(dir.path(), 2_000, &[("math", "dot", 2.0), ("math", "cross", 7.0)]);

    let mut aggregator = BenchmarkAggregator::new();
    aggregator.scan_directory(dir.path()).unwrap();

    let dot = aggregator.find("math", "dot").unwrap();
    let ticks: Vec<f64> = aggregator.serie(dot).unwrap().points().iter().map(|p| p.ticks).collect();
    assert_eq!(ticks, vec![1.0, 2.0, 3.0]);

    let cross = aggregator.find("math", "cross").unwrap();
    assert_eq!(aggregator.serie(cross).unwrap().len(), 1);
    assert_ne!(dot, cross);
}

#[test]
fn test_unreadable_files_skipped() {
    let dir = tempfile::tempdir().unwrap();
    write_run(dir.path(), 100, &[("math", "dot", 1.0)]);
    fs::write(dir.path().join("run_999.json"), "[1, 2").unwrap();
    fs::write(dir.path().join("notes.txt"), "not a record").unwrap();

    let mut aggregator = BenchmarkAggregator::new();
    let report = aggregator.scan_directory(dir.path()).unwrap();

    assert_eq!(report.loaded, 1);
    assert_eq!(report.skipped, 1);
    assert_eq!(aggregator.case_count(), 1);
}

#[test]
fn test_missing_directory_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let mut aggregator = BenchmarkAggregator::new();

    let report = aggregator.scan_directory(&dir.path().join("never-created")).unwrap();
    assert_eq!(report.loaded, 0);
    assert!(aggregator.benchmarks().is_empty());
}

#[test]
fn test_file_instead_of_directory_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("plain.json");
    fs::write(&file, "{}").unwrap();

    let mut aggregator = BenchmarkAggregator::new();
    assert!(matches!(
        aggregator.scan_directory(&file),
        Err(AggregatorError::NotADirectory(_))
    ));
}

#[test]
fn test_clear_then_rescan_is_stable() {
    let dir = tempfile::tempdir().unwrap();
    write_run(dir.path(), 100, &[("math", "dot", 1.0), ("io", "read", 2.0)]);

    let mut aggregator = BenchmarkAggregator::new();
    aggregator.scan_directory(dir.path()).unwrap();
    let first = build_tree_nodes(aggregator.benchmarks());

    aggregator.clear();
    assert_eq!(aggregator.case_count(), 0);
    aggregator.scan_directory(dir.path()).unwrap();
    let second = build_tree_nodes(aggregator.benchmarks());

    assert_eq!(first, second);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_serie_dates_non_decreasing(stamps in prop::collection::vec(0i64..1_000_000, 1..20)) {
        let mut aggregator = BenchmarkAggregator::new();
        for (i, secs) in stamps.iter().enumerate() {
            let ts = Utc.timestamp_opt(*secs, 0).single().unwrap();
            let mut record = RunRecord::new(ts, None, HostInfo::default());
            record.results.push(CaseResult::new("suite", "case", i as f64));
            aggregator.add_record(&record);
        }

        let id = aggregator.find("suite", "case").unwrap();
        let serie = aggregator.serie(id).unwrap();
        prop_assert_eq!(serie.len(), stamps.len());
        for pair in serie.points().windows(2) {
            prop_assert!(pair[0].date <= pair[1].date);
        }
    }
}
