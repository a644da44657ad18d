//! Core data structures shared by the aggregator, the runner and the UI.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Opaque identifier of a benchmark case, assigned by the aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CaseId(u64);

impl CaseId {
    pub fn new(raw: u64) -> Self {
        CaseId(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One recorded timing of a benchmark case.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    /// When the run that produced this point started
    pub date: DateTime<Utc>,
    /// Mean nanoseconds per iteration
    pub ticks: f64,
}

impl DataPoint {
    pub fn new(date: DateTime<Utc>, ticks: f64) -> Self {
        DataPoint { date, ticks }
    }
}

/// Time series of a single benchmark case, ordered by date.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Serie {
    points: Vec<DataPoint>,
}

impl Serie {
    pub fn new() -> Self {
        Serie { points: Vec::new() }
    }

    /// Insert a point keeping date order. Points sharing a date stay in
    /// insertion order.
    pub fn push(&mut self, point: DataPoint) {
        let idx = self.points.partition_point(|p| p.date <= point.date);
        self.points.insert(idx, point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[DataPoint] {
        &self.points
    }

    pub fn get(&self, index: usize) -> Option<&DataPoint> {
        self.points.get(index)
    }

    pub fn latest(&self) -> Option<&DataPoint> {
        self.points.last()
    }
}

/// Hierarchical view of every known case: groups of groups, with leaf cases
/// tagged by their [`CaseId`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BenchmarkTree {
    pub groups: BTreeMap<String, BenchmarkTree>,
    pub cases: BTreeMap<String, CaseId>,
}

impl BenchmarkTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty() && self.cases.is_empty()
    }

    /// Register `case` under the group path of `suite`. A suite such as
    /// `"storage/cache"` becomes two nested groups.
    pub fn insert(&mut self, suite: &str, case: &str, id: CaseId) {
        let mut node = self;
        for segment in suite_segments(suite) {
            node = node.groups.entry(segment.to_string()).or_default();
        }
        node.cases.insert(case.to_string(), id);
    }

    /// Follow a path of labels (groups, then optionally a case) and return
    /// the case id at its end.
    pub fn find_case(&self, path: &[String]) -> Option<CaseId> {
        let (last, groups) = path.split_last()?;
        let mut node = self;
        for segment in groups {
            node = node.groups.get(segment)?;
        }
        node.cases.get(last).copied()
    }

    /// Total number of leaf cases in this subtree.
    pub fn case_count(&self) -> usize {
        self.cases.len() + self.groups.values().map(BenchmarkTree::case_count).sum::<usize>()
    }
}

/// Split a suite name into its group segments, ignoring empty segments.
pub fn suite_segments(suite: &str) -> impl Iterator<Item = &str> {
    suite.split('/').map(str::trim).filter(|s| !s.is_empty())
}
