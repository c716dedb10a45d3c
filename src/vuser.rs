//! A closed-loop request driver: one in-flight request at a time, obeying
//! the run's latches at every suspension point. The active-request counter
//! is paired with an RAII guard that pairs acquire/release around a
//! request.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tokio::time::{Instant, sleep};

use crate::curl::RequestTemplate;
use crate::metrics::{COUNTER_REQUEST_ACTIVE, COUNTER_REQUEST_ERROR, COUNTER_REQUEST_TOTAL, COUNTER_USER, MetricRegistry};
use crate::run::RunHandle;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const ABSTRACT_LEN: usize = 50;

struct ActiveGuard<'metrics> {
    metrics: &'metrics MetricRegistry,
}

impl<'metrics> ActiveGuard<'metrics> {
    fn acquire(metrics: &'metrics MetricRegistry) -> Self {
        metrics.inc(COUNTER_REQUEST_ACTIVE);
        Self { metrics }
    }
}

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.metrics.dec(COUNTER_REQUEST_ACTIVE);
    }
}

/// Runs one virtual user's lifecycle to completion. Spawned once per user
/// by the controller with its own stagger delay.
pub async fn run_virtual_user(handle: Arc<RunHandle>, client: Client, start_delay: Duration) {
    sleep(start_delay).await;
    handle.metrics.inc(COUNTER_USER);

    loop {
        if handle.stopping_latch.is_set() {
            handle.metrics.dec(COUNTER_USER);
            return;
        }

        if !handle.running_latch.is_set() {
            handle.metrics.dec(COUNTER_USER);
            handle.running_latch.wait().await;
            if handle.stopping_latch.is_set() {
                return;
            }
            sleep(start_delay).await;
            handle.metrics.inc(COUNTER_USER);
            continue;
        }

        issue_one_request(&handle, &client).await;
    }
}

async fn issue_one_request(handle: &Arc<RunHandle>, client: &Client) {
    let _active = ActiveGuard::acquire(&handle.metrics);
    let t0 = Instant::now();

    let timeout = handle
        .config
        .timeout_override
        .or(handle.config.template.max_time)
        .unwrap_or(DEFAULT_REQUEST_TIMEOUT);

    let outcome = tokio::time::timeout(timeout, send_request(client, &handle.config.template)).await;
    let elapsed_ms = u64::try_from(t0.elapsed().as_millis()).unwrap_or(u64::MAX);

    match outcome {
        Ok(Ok((status, abstract_text))) => {
            record_latency(&handle.metrics, elapsed_ms);
            handle.metrics.inc(COUNTER_REQUEST_TOTAL);
            if (400..600).contains(&status) {
                handle.metrics.inc(COUNTER_REQUEST_ERROR);
                handle.metrics.inc(&error_counter_name(&status.to_string(), &abstract_text));
            }
        }
        Ok(Err((kind, message))) => {
            record_latency(&handle.metrics, elapsed_ms);
            handle.metrics.inc(COUNTER_REQUEST_TOTAL);
            handle.metrics.inc(COUNTER_REQUEST_ERROR);
            handle.metrics.inc(&error_counter_name(&kind, &message));
        }
        Err(elapsed) => {
            record_latency(&handle.metrics, elapsed_ms);
            handle.metrics.inc(COUNTER_REQUEST_TOTAL);
            handle.metrics.inc(COUNTER_REQUEST_ERROR);
            handle.metrics.inc(&error_counter_name("Timeout", &elapsed.to_string()));
        }
    }
}

fn record_latency(metrics: &MetricRegistry, elapsed_ms: u64) {
    if let Err(err) = metrics.observe(elapsed_ms) {
        tracing::warn!("failed to record latency sample: {}", err);
    }
}

/// Sends the templated request once and returns `(status, abstract)` on
/// completion, or `(kind, message)` on a transport/build failure — `message`
/// is the real error text (truncated by [`error_counter_name`]), not a
/// fixed placeholder, so distinct failures land in distinct error buckets.
async fn send_request(client: &Client, template: &RequestTemplate) -> Result<(u16, String), (String, String)> {
    let method = reqwest::Method::from_bytes(template.method.as_str().as_bytes())
        .map_err(|source| ("InvalidMethod".to_owned(), source.to_string()))?;
    let mut builder = client.request(method, &template.url);

    for (name, value) in &template.headers {
        builder = builder.header(name, value);
    }
    if let Some(auth) = &template.auth {
        builder = builder.basic_auth(&auth.username, Some(&auth.password));
    }
    if let Some(body) = &template.body {
        builder = builder.body(body.clone());
    }

    let response = builder.send().await.map_err(|err| classify_transport_error(&err))?;
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    Ok((status, truncate_abstract(&body)))
}

/// Classifies a transport failure into `(kind, message)`, carrying the
/// real `reqwest::Error` text rather than a generic placeholder.
fn classify_transport_error(err: &reqwest::Error) -> (String, String) {
    let kind = if err.is_timeout() {
        "Timeout"
    } else if err.is_connect() {
        "ConnectError"
    } else {
        "RequestError"
    };
    (kind.to_owned(), err.to_string())
}

fn truncate_abstract(text: &str) -> String {
    text.chars().take(ABSTRACT_LEN).collect()
}

fn error_counter_name(kind: &str, message: &str) -> String {
    let abstract_text: String = message.chars().take(ABSTRACT_LEN).collect();
    format!("error.{kind}.{abstract_text}")
}
