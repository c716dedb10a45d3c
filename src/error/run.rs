use thiserror::Error;

/// An unknown run id and a rejected duplicate start are deliberately not
/// represented here: both are silent no-ops rather than errors, so the
/// controller and registry surface them as unchanged state rather than
/// `Err`.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("interval must be >= 1 second, got {interval_secs}")]
    IntervalTooSmall { interval_secs: u64 },
    #[error("failed to build the shared HTTP client: {source}")]
    HttpClientBuild {
        #[source]
        source: reqwest::Error,
    },
    #[error("run '{run_id}' is not present in the registry")]
    RunNotFound { run_id: String },
}

impl From<reqwest::Error> for RunError {
    fn from(source: reqwest::Error) -> Self {
        RunError::HttpClientBuild { source }
    }
}

pub type RunResult<T> = Result<T, RunError>;
