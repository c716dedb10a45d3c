//! The single per-run task that turns the live counters in the metric
//! registry into event-log frames: a `tokio::spawn(async move { ... })` task
//! that owns its own running totals and ticks on a fixed interval, following
//! a single-cadence loop rather than a multi-branch `select!` over several
//! independent timers.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{Instant, sleep};

use crate::cpu::CpuSampler;
use crate::error::MetricsError;
use crate::eventlog::{Frame, FrameOp, Plot};
use crate::metrics::{COUNTER_REQUEST_ERROR, COUNTER_REQUEST_TOTAL, COUNTER_USER, MetricRegistry};
use crate::run::{RunHandle, RunStatus};

/// Running totals carried across sampler iterations.
struct SamplerState {
    last_total: i64,
    last_errors: i64,
    start_time: Instant,
}

/// Runs the sampler loop to completion, then appends the end-of-stream
/// sentinel exactly once.
///
/// Spawned once per run by the controller alongside the virtual-user fleet.
pub async fn run_sampler(handle: Arc<RunHandle>, cpu_sampler: Arc<dyn CpuSampler>) {
    let mut state = SamplerState {
        last_total: 0,
        last_errors: 0,
        start_time: Instant::now(),
    };

    loop {
        if let Err(err) = tick(&handle, &mut state, cpu_sampler.as_ref()) {
            emit_internal_error_frame(&handle, &err);
            break;
        }

        if handle.stopping_latch.is_set() {
            break;
        }
        if !handle.running_latch.is_set() {
            handle.running_latch.wait().await;
            continue;
        }
        sleep(handle.config.interval).await;
    }

    handle.events.close_stream();
}

/// One sampler iteration: reset on pause, throughput/latency/system/error
/// frame emission.
fn tick(handle: &RunHandle, state: &mut SamplerState, cpu_sampler: &dyn CpuSampler) -> Result<(), MetricsError> {
    let paused = !handle.running_latch.is_set() && !handle.stopping_latch.is_set();
    if paused {
        handle.metrics.reset()?;
        state.last_total = 0;
        state.last_errors = 0;
    }

    let now = truncate_to_centiseconds(state.start_time.elapsed());
    let metrics = handle.metrics.as_ref();

    let total = metrics.get(COUNTER_REQUEST_TOTAL);
    let throughput = (total - state.last_total) as f64 / handle.config.interval.as_secs_f64();
    handle.events.append(Frame::point(Plot::Throughput, 0, FrameOp::Extend, now, throughput));
    state.last_total = total;

    let errors = metrics.get(COUNTER_REQUEST_ERROR);
    let error_rate = (errors - state.last_errors) as f64 / handle.config.interval.as_secs_f64();
    handle.events.append(Frame::point(Plot::Throughput, 1, FrameOp::Extend, now, error_rate));
    state.last_errors = errors;

    if total > 0 {
        let latency = metrics.snapshot();
        handle.events.append(Frame::point(Plot::Latency, 0, FrameOp::Extend, now, latency.max as f64));
        handle.events.append(Frame::point(Plot::Latency, 1, FrameOp::Extend, now, latency.p99 as f64));
        handle.events.append(Frame::point(Plot::Latency, 2, FrameOp::Extend, now, latency.median as f64));
    }

    append_system_frame(handle, metrics, cpu_sampler.cpu_percent());
    append_error_frame(handle, metrics);

    Ok(())
}

fn append_system_frame(handle: &RunHandle, metrics: &MetricRegistry, cpu_percent: f64) {
    let status = match handle.status() {
        RunStatus::Stopped => "stopped",
        RunStatus::Running => "running",
        RunStatus::Paused => "paused",
    };
    let row = vec![
        vec![serde_json::Value::from(status)],
        vec![serde_json::Value::from(metrics.get(COUNTER_USER))],
        vec![serde_json::Value::from(metrics.get(COUNTER_REQUEST_TOTAL))],
        vec![serde_json::Value::from(metrics.get(COUNTER_REQUEST_ERROR))],
        vec![serde_json::Value::from(metrics.snapshot().mean)],
        vec![serde_json::Value::from(cpu_percent)],
    ];
    handle.events.append(Frame::table(Plot::System, 0, FrameOp::Replace, row));
}

/// Splits each `error.<kind>.<abstract>` counter once on `.` and emits three
/// parallel columns (kind, abstract, count), sorted descending by count.
fn append_error_frame(handle: &RunHandle, metrics: &MetricRegistry) {
    let mut buckets: Vec<(String, String, i64)> = metrics
        .enumerate("error.")
        .into_iter()
        .filter_map(|(name, count)| {
            let rest = name.strip_prefix("error.")?;
            let (kind, abstract_text) = rest.split_once('.').unwrap_or((rest, ""));
            Some((kind.to_owned(), abstract_text.to_owned(), count))
        })
        .collect();
    buckets.sort_by(|a, b| b.2.cmp(&a.2));

    let kinds = buckets.iter().map(|(kind, _, _)| serde_json::Value::from(kind.clone())).collect();
    let abstracts = buckets
        .iter()
        .map(|(_, abstract_text, _)| serde_json::Value::from(abstract_text.clone()))
        .collect();
    let counts = buckets.iter().map(|(_, _, count)| serde_json::Value::from(*count)).collect();

    handle
        .events
        .append(Frame::table(Plot::Error, 0, FrameOp::Replace, vec![kinds, abstracts, counts]));
}

/// Any uncaught failure inside the loop appends a single `error` frame
/// `[["Bees internal error: <Kind>"], [message], [1]]` before the loop exits.
fn emit_internal_error_frame(handle: &RunHandle, err: &MetricsError) {
    let kind = err.kind_label();
    let row = vec![
        vec![serde_json::Value::from(format!("Bees internal error: {kind}"))],
        vec![serde_json::Value::from(err.to_string())],
        vec![serde_json::Value::from(1)],
    ];
    handle.events.append(Frame::table(Plot::Error, 0, FrameOp::Replace, row));
}

fn truncate_to_centiseconds(elapsed: Duration) -> f64 {
    (elapsed.as_secs_f64() * 100.0).trunc() / 100.0
}
