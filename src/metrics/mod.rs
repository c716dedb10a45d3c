//! C2: Metric Registry. Per-run counters and one latency histogram.

mod histogram;
mod registry;
mod types;

pub use registry::{
    COUNTER_REQUEST_ACTIVE, COUNTER_REQUEST_ERROR, COUNTER_REQUEST_TOTAL, COUNTER_USER, MetricRegistry,
};
pub use types::{CounterValue, LatencySummary};
