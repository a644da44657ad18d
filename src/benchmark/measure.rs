//! Timing of a single benchmark case.
//!
//! Each iteration is timed individually with `Instant` and recorded into an
//! `hdrhistogram` at nanosecond resolution. The reported "ticks" value is the
//! exact arithmetic mean; the histogram supplies percentiles.

use crate::error::RunnerError;
use hdrhistogram::Histogram;
use std::time::Instant;

/// Highest trackable iteration time: 60 seconds in nanoseconds
const MAX_TRACKABLE_NS: u64 = 60_000_000_000;

/// How many times a case body is executed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MeasureConfig {
    pub warmup_iterations: u64,
    pub iterations: u64,
}

impl Default for MeasureConfig {
    fn default() -> Self {
        MeasureConfig {
            warmup_iterations: 100,
            iterations: 1_000,
        }
    }
}

/// Timing summary of one case
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Measurement {
    pub mean_ns: f64,
    pub p50_ns: f64,
    pub p99_ns: f64,
    pub iterations: u64,
}

/// Run `body` `warmup_iterations` times untimed, then `iterations` times
/// timed. At least one timed iteration always happens.
pub fn measure<F: FnMut()>(mut body: F, config: &MeasureConfig) -> Result<Measurement, RunnerError> {
    let mut histogram = Histogram::<u64>::new_with_bounds(1, MAX_TRACKABLE_NS, 3)
        .map_err(|e| RunnerError::Measurement(e.to_string()))?;

    for _ in 0..config.warmup_iterations {
        body();
    }

    let iterations = config.iterations.max(1);
    let mut total_ns: u128 = 0;
    for _ in 0..iterations {
        let start = Instant::now();
        body();
        let elapsed = start.elapsed().as_nanos();
        total_ns += elapsed;
        let sample = u64::try_from(elapsed).unwrap_or(u64::MAX).max(1);
        histogram.saturating_record(sample);
    }

    Ok(Measurement {
        mean_ns: total_ns as f64 / iterations as f64,
        p50_ns: histogram.value_at_quantile(0.5) as f64,
        p99_ns: histogram.value_at_quantile(0.99) as f64,
        iterations,
    })
}
