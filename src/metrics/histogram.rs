//! Latency histogram wrapper. Wire/base64 encoding is dropped: nothing
//! downstream of a snapshot needs to move a histogram across a process
//! boundary, so only the in-process summary is kept.

use hdrhistogram::Histogram;

use crate::error::MetricsError;

use super::types::LatencySummary;

#[derive(Debug)]
pub struct LatencyHistogram {
    hist: Histogram<u64>,
}

impl LatencyHistogram {
    /// # Errors
    ///
    /// Returns an error if the underlying histogram cannot be allocated.
    pub fn new() -> Result<Self, MetricsError> {
        let hist = Histogram::<u64>::new(3).map_err(|source| MetricsError::HistogramCreate { source })?;
        Ok(Self { hist })
    }

    /// Records a latency value in milliseconds. Values are clamped to at
    /// least 1ms since `hdrhistogram` cannot represent zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is rejected by the histogram.
    pub fn record(&mut self, latency_ms: u64) -> Result<(), MetricsError> {
        self.hist
            .record(latency_ms.max(1))
            .map_err(|source| MetricsError::HistogramRecord { source })
    }

    #[must_use]
    pub fn summary(&self) -> LatencySummary {
        let count = self.hist.len();
        if count == 0 {
            return LatencySummary::default();
        }

        LatencySummary {
            count,
            mean: self.hist.mean(),
            max: self.hist.max(),
            median: self.hist.value_at_quantile(0.5),
            p99: self.hist.value_at_quantile(0.99),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_histogram_summarizes_to_zero() -> Result<(), String> {
        let hist = LatencyHistogram::new().map_err(|err| err.to_string())?;
        let summary = hist.summary();
        if summary.count != 0 {
            return Err(format!("expected count 0, got {}", summary.count));
        }
        Ok(())
    }

    #[test]
    fn summary_reports_expected_quantiles() -> Result<(), String> {
        let mut hist = LatencyHistogram::new().map_err(|err| err.to_string())?;
        for value in 1..=1000 {
            hist.record(value).map_err(|err| err.to_string())?;
        }
        let summary = hist.summary();
        if summary.count != 1000 {
            return Err(format!("expected count 1000, got {}", summary.count));
        }
        if summary.median < 490 || summary.median > 510 {
            return Err(format!("median out of range: {}", summary.median));
        }
        if summary.p99 < 985 {
            return Err(format!("p99 too low: {}", summary.p99));
        }
        Ok(())
    }

    #[test]
    fn median_and_p99_are_non_decreasing_as_max_is_repeated() -> Result<(), String> {
        let mut hist = LatencyHistogram::new().map_err(|err| err.to_string())?;
        for value in 1..=100 {
            hist.record(value).map_err(|err| err.to_string())?;
        }
        let before = hist.summary();
        for _ in 0..2000 {
            hist.record(100).map_err(|err| err.to_string())?;
        }
        let after = hist.summary();
        if after.median < before.median {
            return Err("median decreased".to_owned());
        }
        if after.p99 < before.p99 {
            return Err("p99 decreased".to_owned());
        }
        Ok(())
    }

    #[test]
    fn zero_is_clamped_to_one_millisecond() -> Result<(), String> {
        let mut hist = LatencyHistogram::new().map_err(|err| err.to_string())?;
        if hist.record(0).is_err() {
            return Err("recording 0 should be clamped, not rejected".to_owned());
        }
        Ok(())
    }
}
