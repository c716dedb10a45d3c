//! Run lifecycle: ramp-up, duration, pause/resume, stop, cleanup. A thin
//! public API (`start_run`/`pause_run`/`resume_run`/`stop_run`) backed by
//! one spawned lifecycle task per run that hands off to a
//! background-driven execution loop.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tokio::time::sleep;

use crate::config::RuntimeConfig;
use crate::cpu::CpuSampler;
use crate::curl::RequestTemplate;
use crate::error::{BeesError, BeesResult, RunError};
use crate::eventlog::EventLog;
use crate::metrics::MetricRegistry;
use crate::sampler::run_sampler;
use crate::vuser::run_virtual_user;

use super::handle::{RunConfig, RunHandle, RunStatus};
use super::registry::RunRegistry;

/// Result of a `start_run` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    AlreadyRunning,
}

/// Result of a `pause_run`/`resume_run`/`stop_run` call. Control operations
/// on an absent run id are no-op successes, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlOutcome {
    Applied(RunStatus),
    Unknown,
}

/// Owns the process-wide [`RunRegistry`] plus the shared collaborators every
/// run needs (an HTTP client for the virtual-user fleet, a [`CpuSampler`]
/// for the sampler). One `RunController` per process; cloning is cheap
/// (everything inside is `Arc`).
#[derive(Clone)]
pub struct RunController {
    registry: Arc<RunRegistry>,
    config: RuntimeConfig,
    http_client: Client,
    insecure_http_client: Client,
    cpu_sampler: Arc<dyn CpuSampler>,
}

impl RunController {
    /// # Errors
    ///
    /// Returns an error if either shared `reqwest::Client` cannot be built.
    pub fn new(config: RuntimeConfig, cpu_sampler: Arc<dyn CpuSampler>) -> BeesResult<Self> {
        let http_client = Client::builder()
            .cookie_store(false)
            .build()
            .map_err(|source| BeesError::Run(RunError::from(source)))?;
        let insecure_http_client = Client::builder()
            .cookie_store(false)
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(|source| BeesError::Run(RunError::from(source)))?;
        Ok(Self {
            registry: Arc::new(RunRegistry::new()),
            config,
            http_client,
            insecure_http_client,
            cpu_sampler,
        })
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<RunRegistry> {
        &self.registry
    }

    /// Starts a new run. Returns immediately once the run is registered and
    /// its tasks are spawned; the run itself proceeds on a background task
    /// (the embedding HTTP layer's start endpoint responds with
    /// `{status:"running", ...}` without waiting for it).
    ///
    /// # Errors
    ///
    /// Returns an error if `interval < 1s` or the run's metric registry
    /// cannot be allocated.
    pub fn start_run(
        &self,
        run_id: String,
        template: RequestTemplate,
        users: Option<u32>,
        duration: Duration,
        timeout_override: Option<Duration>,
        interval: Duration,
    ) -> BeesResult<StartOutcome> {
        if interval < Duration::from_secs(1) {
            return Err(BeesError::Run(RunError::IntervalTooSmall {
                interval_secs: interval.as_secs(),
            }));
        }
        let users = users.unwrap_or(self.config.default_users).max(1);

        let verify_tls = template.verify_tls;
        let run_config = RunConfig {
            template,
            users,
            duration,
            timeout_override,
            interval,
        };
        let metrics = Arc::new(MetricRegistry::new()?);
        let events = Arc::new(EventLog::new());
        let handle = Arc::new(RunHandle::new(run_id.clone(), run_config, metrics, events));

        if !self.registry.insert_if_absent(run_id.clone(), Arc::clone(&handle)) {
            return Ok(StartOutcome::AlreadyRunning);
        }

        let registry = Arc::clone(&self.registry);
        let max_cold_start = self.config.max_cold_start;
        let grace_window = self.config.grace_window;
        let http_client = if verify_tls {
            self.http_client.clone()
        } else {
            self.insecure_http_client.clone()
        };
        let cpu_sampler = Arc::clone(&self.cpu_sampler);

        tokio::spawn(async move {
            run_lifecycle(handle, registry, max_cold_start, grace_window, http_client, cpu_sampler).await;
        });

        Ok(StartOutcome::Started)
    }

    /// Transitions `running → paused`. A no-op if the run is absent or
    /// already `stopped`.
    #[must_use]
    pub fn pause_run(&self, run_id: &str) -> ControlOutcome {
        let Some(handle) = self.registry.get(run_id) else {
            return ControlOutcome::Unknown;
        };
        if handle.status() != RunStatus::Stopped {
            handle.running_latch.clear();
        }
        ControlOutcome::Applied(handle.status())
    }

    /// Transitions `paused → running`. A no-op if the run is absent or
    /// already `stopped`.
    #[must_use]
    pub fn resume_run(&self, run_id: &str) -> ControlOutcome {
        let Some(handle) = self.registry.get(run_id) else {
            return ControlOutcome::Unknown;
        };
        if handle.status() != RunStatus::Stopped {
            handle.running_latch.set();
        }
        ControlOutcome::Applied(handle.status())
    }

    /// Transitions either state → `stopped` (terminal). Also sets
    /// `runningLatch` so every task currently parked in its pause wait wakes
    /// up to observe `stoppingLatch`.
    #[must_use]
    pub fn stop_run(&self, run_id: &str) -> ControlOutcome {
        let Some(handle) = self.registry.get(run_id) else {
            return ControlOutcome::Unknown;
        };
        handle.stopping_latch.set();
        handle.running_latch.set();
        ControlOutcome::Applied(RunStatus::Stopped)
    }
}

/// Spawns the sampler and virtual-user fleet, runs the duration loop, then
/// tears the run down. Runs on its own task so `start_run` can return
/// promptly.
async fn run_lifecycle(
    handle: Arc<RunHandle>,
    registry: Arc<RunRegistry>,
    max_cold_start: Duration,
    grace_window: Duration,
    http_client: Client,
    cpu_sampler: Arc<dyn CpuSampler>,
) {
    let sampler_handle = Arc::clone(&handle);
    handle.track_task(tokio::spawn(async move {
        run_sampler(sampler_handle, cpu_sampler).await;
    }));

    let cold_start = duration_min(handle.config.duration / 3, max_cold_start);
    let stagger = cold_start.div_f64(f64::from(handle.config.users.max(1)));

    for i in 0..handle.config.users {
        let vu_handle = Arc::clone(&handle);
        let client = http_client.clone();
        let start_delay = stagger.mul_f64(f64::from(i));
        handle.track_task(tokio::spawn(async move {
            run_virtual_user(vu_handle, client, start_delay).await;
        }));
    }

    handle.running_latch.set();

    let total_seconds = handle.config.duration.as_secs();
    for _ in 0..total_seconds {
        if handle.stopping_latch.is_set() {
            break;
        }
        if !handle.running_latch.is_set() {
            handle.running_latch.wait().await;
            continue;
        }
        sleep(Duration::from_secs(1)).await;
    }
    handle.stopping_latch.set();

    handle.join_tasks().await;

    sleep(grace_window).await;
    registry.remove(&handle.run_id);
}

fn duration_min(a: Duration, b: Duration) -> Duration {
    if a < b { a } else { b }
}
