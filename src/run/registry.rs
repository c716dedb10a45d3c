//! A process-wide `runId → RunHandle` map, backed by `DashMap` for the same
//! reason the metric registry is: many tasks read/insert/remove
//! concurrently and none of them need to hold a lock across an `.await`.

use std::sync::Arc;

use dashmap::DashMap;

use super::handle::RunHandle;

#[derive(Default)]
pub struct RunRegistry {
    runs: DashMap<String, Arc<RunHandle>>,
}

impl RunRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, run_id: &str) -> Option<Arc<RunHandle>> {
        self.runs.get(run_id).map(|entry| Arc::clone(entry.value()))
    }

    /// Inserts `handle` unless `run_id` is already present. Returns `true`
    /// if the insert happened; re-use of a run id while present is a no-op
    /// on start.
    pub fn insert_if_absent(&self, run_id: String, handle: Arc<RunHandle>) -> bool {
        match self.runs.entry(run_id) {
            dashmap::mapref::entry::Entry::Occupied(_) => false,
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(handle);
                true
            }
        }
    }

    pub fn remove(&self, run_id: &str) {
        self.runs.remove(run_id);
    }

    #[must_use]
    pub fn contains(&self, run_id: &str) -> bool {
        self.runs.contains_key(run_id)
    }
}
