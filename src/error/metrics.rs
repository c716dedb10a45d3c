use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("failed to create latency histogram: {source}")]
    HistogramCreate {
        #[source]
        source: hdrhistogram::CreationError,
    },
    #[error("failed to record latency sample: {source}")]
    HistogramRecord {
        #[source]
        source: hdrhistogram::RecordError,
    },
    #[error("latency histogram lock was poisoned by a panicked holder")]
    LockPoisoned,
}

impl MetricsError {
    /// The `<Kind>` label used in the sampler's internal-error frame,
    /// `"Bees internal error: <Kind>"`.
    #[must_use]
    pub const fn kind_label(&self) -> &'static str {
        match self {
            MetricsError::HistogramCreate { .. } => "HistogramCreateError",
            MetricsError::HistogramRecord { .. } => "HistogramRecordError",
            MetricsError::LockPoisoned => "LockPoisoned",
        }
    }
}

pub type MetricsResult<T> = Result<T, MetricsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_label_is_stable_per_variant() {
        assert_eq!(MetricsError::LockPoisoned.kind_label(), "LockPoisoned");
    }
}
