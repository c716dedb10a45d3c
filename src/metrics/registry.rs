//! Fixed counters plus on-demand `error.<Kind>.<abstract>` counters, backed
//! by a `DashMap` wherever a map needs lock-free concurrent reads. The
//! histogram is the one piece of state that genuinely needs exclusive
//! access to mutate, so it sits behind a plain `std::sync::Mutex` — no
//! `.await` is ever held across the lock.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

use dashmap::DashMap;

use crate::error::MetricsError;

use super::histogram::LatencyHistogram;
use super::types::{CounterValue, LatencySummary};

pub const COUNTER_USER: &str = "user";
pub const COUNTER_REQUEST_TOTAL: &str = "request.total";
pub const COUNTER_REQUEST_ERROR: &str = "request.error";
pub const COUNTER_REQUEST_ACTIVE: &str = "request.active";

const FIXED_COUNTERS: [&str; 4] = [
    COUNTER_USER,
    COUNTER_REQUEST_TOTAL,
    COUNTER_REQUEST_ERROR,
    COUNTER_REQUEST_ACTIVE,
];

/// Per-run counters and the single latency histogram.
pub struct MetricRegistry {
    counters: DashMap<String, AtomicI64>,
    latency: Mutex<LatencyHistogram>,
}

impl MetricRegistry {
    /// # Errors
    ///
    /// Returns an error if the latency histogram cannot be allocated.
    pub fn new() -> Result<Self, MetricsError> {
        let counters = DashMap::new();
        for name in FIXED_COUNTERS {
            counters.insert(name.to_owned(), AtomicI64::new(0));
        }
        Ok(Self {
            counters,
            latency: Mutex::new(LatencyHistogram::new()?),
        })
    }

    pub fn inc(&self, name: &str) {
        self.counter_entry(name).fetch_add(1, Ordering::Relaxed);
    }

    pub fn dec(&self, name: &str) {
        self.counter_entry(name).fetch_sub(1, Ordering::Relaxed);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> CounterValue {
        self.counters
            .get(name)
            .map_or(0, |counter| counter.load(Ordering::Relaxed))
    }

    /// Records a latency sample (milliseconds) into `response.latency`.
    ///
    /// # Errors
    ///
    /// Returns an error if the histogram rejects the value.
    pub fn observe(&self, latency_ms: u64) -> Result<(), MetricsError> {
        let mut hist = self.latency.lock().map_err(|_| MetricsError::LockPoisoned)?;
        hist.record(latency_ms)
    }

    /// Returns the zero summary if the histogram lock is poisoned; a
    /// stalled chart is preferable to propagating a panic from an unrelated
    /// task into the sampler loop.
    #[must_use]
    pub fn snapshot(&self) -> LatencySummary {
        self.latency.lock().map(|hist| hist.summary()).unwrap_or_default()
    }

    /// All counters whose name starts with `prefix`, in no particular order.
    #[must_use]
    pub fn enumerate(&self, prefix: &str) -> Vec<(String, CounterValue)> {
        self.counters
            .iter()
            .filter(|entry| entry.key().starts_with(prefix))
            .map(|entry| (entry.key().clone(), entry.value().load(Ordering::Relaxed)))
            .collect()
    }

    /// Zeroes every counter and replaces the histogram with a fresh one.
    /// This is the only legitimate reason the stream shows a restart;
    /// individual operations are not globally serialized against concurrent
    /// `inc`/`observe` calls, so a counter incremented mid-reset may be
    /// lost, which is tolerated.
    ///
    /// # Errors
    ///
    /// Returns an error if the replacement histogram cannot be allocated.
    pub fn reset(&self) -> Result<(), MetricsError> {
        for name in FIXED_COUNTERS {
            self.counter_entry(name).store(0, Ordering::Relaxed);
        }
        self.counters.retain(|name, _| FIXED_COUNTERS.contains(&name.as_str()));

        let fresh = LatencyHistogram::new()?;
        let mut hist = self.latency.lock().map_err(|_| MetricsError::LockPoisoned)?;
        *hist = fresh;
        Ok(())
    }

    fn counter_entry(&self, name: &str) -> dashmap::mapref::one::Ref<'_, String, AtomicI64> {
        self.counters
            .entry(name.to_owned())
            .or_insert_with(|| AtomicI64::new(0))
            .downgrade()
    }
}
