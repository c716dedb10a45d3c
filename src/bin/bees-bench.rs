//! `bees-bench`: a small CLI front-end over the benchmark runtime, scoped to
//! driving one run directly rather than exposing the full HTTP surface. The
//! real SSE/HTML server stays out of scope; this binary prints the live
//! frame stream to stdout instead.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use bees::cpu::NullCpuSampler;
use bees::curl::parse_curl;
use bees::run::RunController;
use bees::{RuntimeConfig, StartOutcome};
use clap::Parser;
use uuid::Uuid;

#[derive(Debug, Parser)]
#[clap(
    version,
    about = "Drives a cURL-templated HTTP load test and prints its live metrics stream."
)]
struct BenchArgs {
    /// The cURL invocation to replay, e.g. "curl http://example.com".
    #[arg(long)]
    code: String,

    /// Concurrent virtual users.
    #[arg(long, default_value = "10")]
    users: u32,

    /// Benchmark duration in seconds.
    #[arg(long, default_value = "10")]
    duration: u64,

    /// Per-request timeout override in seconds.
    #[arg(long)]
    timeout: Option<u64>,

    /// Sampler interval in seconds.
    #[arg(long, default_value = "2")]
    interval: u64,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = BenchArgs::parse();
    bees::logging::init_logging("info");

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("bees-bench: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: BenchArgs) -> bees::BeesResult<()> {
    let template = parse_curl(&args.code)?;

    let controller = RunController::new(RuntimeConfig::default(), Arc::new(NullCpuSampler))?;
    let run_id = Uuid::new_v4().to_string();

    let outcome = controller.start_run(
        run_id.clone(),
        template,
        Some(args.users),
        Duration::from_secs(args.duration),
        args.timeout.map(Duration::from_secs),
        Duration::from_secs(args.interval),
    )?;
    if outcome != StartOutcome::Started {
        println!("run {run_id} was already active, nothing to do");
        return Ok(());
    }

    println!("started run {run_id}: {} users for {}s", args.users, args.duration);

    let handle = controller
        .registry()
        .get(&run_id)
        .ok_or_else(|| bees::BeesError::Run(bees::error::RunError::RunNotFound { run_id: run_id.clone() }))?;

    let mut cursor = 0;
    loop {
        handle.events.wait_for_more(cursor).await;
        let result = handle.events.read(cursor);
        if let Some(frame) = result.frame {
            print_frame(&frame);
        }
        cursor = result.next_cursor;
        if result.closed && cursor >= handle.events.len() {
            break;
        }
    }

    println!("run {run_id} finished");
    Ok(())
}

/// Prints a frame the same way the embedding server would emit it over
/// SSE (`data: <json>\n\n`, per `spec.md` §6), falling back to `Debug` only
/// if serialization itself fails.
fn print_frame(frame: &bees::eventlog::Frame) {
    match serde_json::to_string(frame) {
        Ok(json) => println!("data: {json}"),
        Err(err) => eprintln!("failed to serialize frame {frame:?}: {err}"),
    }
}
