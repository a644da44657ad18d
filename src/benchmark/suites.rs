//! Built-in benchmark suites.
//!
//! A case is a plain function pointer grouped under a suite name. Suite names
//! use `/` to nest groups in the results tree.

use std::collections::{BTreeMap, HashMap};
use std::hint::black_box;

/// A named, timed unit of work
#[derive(Clone, Copy, Debug)]
pub struct BenchmarkCase {
    pub suite: &'static str,
    pub name: &'static str,
    pub body: fn(),
}

impl BenchmarkCase {
    pub const fn new(suite: &'static str, name: &'static str, body: fn()) -> Self {
        BenchmarkCase { suite, name, body }
    }
}

/// Ordered collection of cases to execute in one run
#[derive(Clone, Debug, Default)]
pub struct SuiteRegistry {
    cases: Vec<BenchmarkCase>,
}

impl SuiteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry populated with the cases shipped with the application
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for case in BUILTIN_CASES {
            registry.register(*case);
        }
        registry
    }

    pub fn register(&mut self, case: BenchmarkCase) {
        self.cases.push(case);
    }

    pub fn cases(&self) -> &[BenchmarkCase] {
        &self.cases
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}

const BUILTIN_CASES: &[BenchmarkCase] = &[
    BenchmarkCase::new("foundation/containers", "vec_push_1k", vec_push_1k),
    BenchmarkCase::new("foundation/containers", "hashmap_insert_1k", hashmap_insert_1k),
    BenchmarkCase::new("foundation/containers", "btreemap_insert_1k", btreemap_insert_1k),
    BenchmarkCase::new("foundation/math", "vector_dot_4k", vector_dot_4k),
    BenchmarkCase::new("foundation/math", "sin_cos_1k", sin_cos_1k),
    BenchmarkCase::new("foundation/string", "format_numbers_256", format_numbers_256),
    BenchmarkCase::new("foundation/string", "split_whitespace", split_whitespace),
    BenchmarkCase::new("algorithms", "sort_unstable_4k", sort_unstable_4k),
    BenchmarkCase::new("algorithms", "binary_search_4k", binary_search_4k),
];

fn vec_push_1k() {
    let mut v = Vec::new();
    for i in 0..1_000u32 {
        v.push(black_box(i));
    }
    black_box(v);
}

fn hashmap_insert_1k() {
    let mut map = HashMap::new();
    for i in 0..1_000u32 {
        map.insert(black_box(i), i.wrapping_mul(31));
    }
    black_box(map);
}

fn btreemap_insert_1k() {
    let mut map = BTreeMap::new();
    for i in 0..1_000u32 {
        map.insert(black_box(i.wrapping_mul(2_654_435_761)), i);
    }
    black_box(map);
}

fn vector_dot_4k() {
    let a: Vec<f64> = (0..4_096).map(|i| i as f64 * 0.5).collect();
    let b: Vec<f64> = (0..4_096).map(|i| (4_096 - i) as f64).collect();
    let dot: f64 = black_box(&a).iter().zip(black_box(&b)).map(|(x, y)| x * y).sum();
    black_box(dot);
}

fn sin_cos_1k() {
    let mut acc = 0.0f64;
    for i in 0..1_000 {
        let x = black_box(i as f64 * 0.001);
        acc += x.sin() * x.cos();
    }
    black_box(acc);
}

fn format_numbers_256() {
    let mut out = String::new();
    for i in 0..256u32 {
        out.push_str(&format!("{:08x};", black_box(i)));
    }
    black_box(out);
}

fn split_whitespace() {
    let text = black_box("the quick brown fox jumps over the lazy dog ").repeat(32);
    let words = text.split_whitespace().count();
    black_box(words);
}

fn sort_unstable_4k() {
    let mut v: Vec<u32> = (0..4_096u32)
        .map(|i| i.wrapping_mul(2_654_435_761) ^ 0x5bd1_e995)
        .collect();
    v.sort_unstable();
    black_box(v);
}

fn binary_search_4k() {
    let v: Vec<u32> = (0..4_096u32).collect();
    let mut hits = 0usize;
    for needle in (0..8_192u32).step_by(7) {
        if v.binary_search(&black_box(needle)).is_ok() {
            hits += 1;
        }
    }
    black_box(hits);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_builtin_cases_unique() {
        let registry = SuiteRegistry::builtin();
        assert!(!registry.is_empty());
        let keys: HashSet<(&str, &str)> = registry.cases().iter().map(|c| (c.suite, c.name)).collect();
        assert_eq!(keys.len(), registry.len());
    }

    #[test]
    fn test_builtin_bodies_run() {
        for case in SuiteRegistry::builtin().cases() {
            (case.body)();
        }
    }
}
