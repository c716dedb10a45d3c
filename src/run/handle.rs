//! `RunHandle`: everything one benchmark run owns.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::curl::RequestTemplate;
use crate::eventlog::EventLog;
use crate::metrics::MetricRegistry;

use super::latch::Latch;

/// A run's externally-visible status, derived from its two latches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Paused,
    Stopped,
}

/// Parameters fixed for the lifetime of a run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub template: RequestTemplate,
    pub users: u32,
    pub duration: Duration,
    pub timeout_override: Option<Duration>,
    pub interval: Duration,
}

/// One run's shared state: the metrics/log it owns exclusively, the two
/// latches every sampler/virtual-user task observes, and the task set the
/// controller joins on shutdown.
pub struct RunHandle {
    pub run_id: String,
    pub config: RunConfig,
    pub metrics: Arc<MetricRegistry>,
    pub events: Arc<EventLog>,
    pub running_latch: Latch,
    pub stopping_latch: Latch,
    tasks: std::sync::Mutex<Vec<JoinHandle<()>>>,
}

impl RunHandle {
    #[must_use]
    pub fn new(
        run_id: String,
        config: RunConfig,
        metrics: Arc<MetricRegistry>,
        events: Arc<EventLog>,
    ) -> Self {
        Self {
            run_id,
            config,
            metrics,
            events,
            running_latch: Latch::new(),
            stopping_latch: Latch::new(),
            tasks: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn track_task(&self, handle: JoinHandle<()>) {
        self.tasks
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(handle);
    }

    /// Derives the run's current status from latch state: stopped >
    /// running > paused, in that precedence.
    #[must_use]
    pub fn status(&self) -> RunStatus {
        if self.stopping_latch.is_set() {
            RunStatus::Stopped
        } else if self.running_latch.is_set() {
            RunStatus::Running
        } else {
            RunStatus::Paused
        }
    }

    /// Drains the tracked task set in reverse launch order, joining each
    /// with `timeout_override or template.maxTime or 10s` plus one second
    /// of grace. Tasks that miss their deadline are abandoned, not forcibly
    /// cancelled: the latch, not the controller, is the cancellation
    /// signal.
    pub async fn join_tasks(&self) {
        let per_task_timeout = self
            .config
            .timeout_override
            .or(self.config.template.max_time)
            .unwrap_or(Duration::from_secs(10))
            + Duration::from_secs(1);

        let mut tasks = {
            let mut guard = self.tasks.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
            std::mem::take(&mut *guard)
        };
        tasks.reverse();

        for task in tasks {
            if tokio::time::timeout(per_task_timeout, task).await.is_err() {
                tracing::warn!(run_id = %self.run_id, "task missed its join deadline, abandoning");
            }
        }
    }
}
