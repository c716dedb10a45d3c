//! Error taxonomy for the benchmark runtime.
//!
//! Each concern gets its own enum; all of them fold into [`BeesError`] via
//! `#[from]` so callers can propagate with `?` without naming the concrete
//! source.

mod curl;
mod metrics;
mod run;

pub use curl::CurlError;
pub use metrics::MetricsError;
pub use run::RunError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BeesError {
    #[error("template error: {0}")]
    Curl(#[from] CurlError),
    #[error("metrics error: {0}")]
    Metrics(#[from] MetricsError),
    #[error("run error: {0}")]
    Run(#[from] RunError),
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("TOML error: {source}")]
    Toml {
        #[from]
        source: toml::de::Error,
    },
}

pub type BeesResult<T> = Result<T, BeesError>;
