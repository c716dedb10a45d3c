//! Snapshot types returned by the metric registry.

/// A point-in-time view of the latency histogram.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LatencySummary {
    pub count: u64,
    pub mean: f64,
    pub max: u64,
    pub median: u64,
    pub p99: u64,
}

/// The value returned by `CounterKind::snapshot` for a plain integer
/// counter, distinct from [`LatencySummary`] so callers can't accidentally
/// mix the two.
pub type CounterValue = i64;
