//! # Threshold Verdicts
//!
//! After a run the scheduler hands back [`RunStats`]: request success and failure
//! counts plus a response-time histogram in milliseconds. Each [`Threshold`] of the
//! scenario is judged against them:
//!
//! - `http_req_duration p(N)<X` passes when the N-th percentile response time is
//!   strictly below `X`.
//! - `http_req_failed rate<X` passes when `failures / (successes + failures)` is
//!   strictly below `X`.
//!
//! A metric with no samples passes and reports no observed value.

use goose::metrics::GooseMetrics;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::scenario::Threshold;

/// Aggregated request metrics of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    pub successes: u64,
    pub failures: u64,
    /// Response time in ms -> number of requests
    pub response_times: BTreeMap<u64, u64>,
}

impl RunStats {
    /// Fold every request metric Goose collected into one aggregate.
    pub fn from_goose(metrics: &GooseMetrics) -> Self {
        let mut stats = Self::default();
        for aggregate in metrics.requests.values() {
            stats.successes += aggregate.success_count as u64;
            stats.failures += aggregate.fail_count as u64;
            for (&ms, &count) in &aggregate.raw_data.times {
                stats.record_times(ms as u64, count as u64);
            }
        }
        stats
    }

    /// Add `count` requests that took `ms` milliseconds.
    pub fn record_times(&mut self, ms: u64, count: u64) {
        if count > 0 {
            *self.response_times.entry(ms).or_default() += count;
        }
    }

    pub fn total_requests(&self) -> u64 {
        self.successes + self.failures
    }

    /// Ratio of failed requests, `None` when nothing was sent.
    pub fn failed_rate(&self) -> Option<f64> {
        match self.total_requests() {
            0 => None,
            total => Some(self.failures as f64 / total as f64),
        }
    }

    /// Response time at `percentile` (0-100) in ms, `None` without samples.
    pub fn percentile(&self, percentile: u8) -> Option<u64> {
        let samples: u64 = self.response_times.values().sum();
        if samples == 0 {
            return None;
        }
        let rank = (samples * u64::from(percentile.min(100)) / 100).min(samples - 1);

        let mut seen = 0;
        for (&ms, &count) in &self.response_times {
            seen += count;
            if seen > rank {
                return Some(ms);
            }
        }
        self.response_times.keys().next_back().copied()
    }
}

/// Outcome of judging one threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThresholdVerdict {
    pub threshold: Threshold,
    /// Observed value: ms for durations, a ratio for failure rates
    pub observed: Option<f64>,
    pub passed: bool,
}

impl fmt::Display for ThresholdVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = if self.passed { "✓" } else { "✗" };
        match (self.observed, &self.threshold) {
            (None, _) => write!(f, "{mark} {} (no samples)", self.threshold),
            (Some(ms), Threshold::Duration { .. }) => {
                write!(f, "{mark} {} (observed {ms:.0}ms)", self.threshold)
            }
            (Some(rate), Threshold::FailedRate { .. }) => {
                write!(f, "{mark} {} (observed {rate:.4})", self.threshold)
            }
        }
    }
}

/// Judge a single threshold against the run's metrics.
pub fn judge(threshold: &Threshold, stats: &RunStats) -> ThresholdVerdict {
    let (observed, passed) = match *threshold {
        Threshold::Duration { percentile, max } => match stats.percentile(percentile) {
            Some(ms) => (Some(ms as f64), u128::from(ms) < max.as_millis()),
            None => (None, true),
        },
        Threshold::FailedRate { max } => match stats.failed_rate() {
            Some(rate) => (Some(rate), rate < max),
            None => (None, true),
        },
    };
    ThresholdVerdict {
        threshold: *threshold,
        observed,
        passed,
    }
}

/// Judge every threshold, in order.
pub fn judge_all(thresholds: &[Threshold], stats: &RunStats) -> Vec<ThresholdVerdict> {
    thresholds.iter().map(|t| judge(t, stats)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn stats(successes: u64, failures: u64, times: &[(u64, u64)]) -> RunStats {
        let mut stats = RunStats {
            successes,
            failures,
            ..RunStats::default()
        };
        for &(ms, count) in times {
            stats.record_times(ms, count);
        }
        stats
    }

    #[test]
    fn test_failed_rate_below_max_passes() {
        let verdict = judge(&Threshold::failed_rate(0.1), &stats(95, 5, &[]));
        assert!(verdict.passed);
        assert_eq!(verdict.observed, Some(0.05));
    }

    #[test]
    fn test_failed_rate_at_max_fails() {
        let verdict = judge(&Threshold::failed_rate(0.1), &stats(90, 10, &[]));
        assert!(!verdict.passed);
    }

    #[test]
    fn test_total_failure_breaches_rate() {
        let verdict = judge(&Threshold::failed_rate(0.1), &stats(0, 250, &[]));
        assert!(!verdict.passed);
        assert_eq!(verdict.observed, Some(1.0));
    }

    #[test]
    fn test_percentile_uses_histogram_rank() {
        // 90 fast, 10 slow: p(90) lands on the first slow sample
        let s = stats(100, 0, &[(100, 90), (3000, 10)]);
        assert_eq!(s.percentile(50), Some(100));
        assert_eq!(s.percentile(89), Some(100));
        assert_eq!(s.percentile(90), Some(3000));
        assert_eq!(s.percentile(100), Some(3000));
    }

    #[test]
    fn test_duration_threshold_verdicts() {
        let s = stats(100, 0, &[(100, 96), (3000, 4)]);
        let p95 = judge(&Threshold::duration(95, Duration::from_millis(2000)), &s);
        assert!(p95.passed);
        assert_eq!(p95.observed, Some(100.0));

        let p99 = judge(&Threshold::duration(99, Duration::from_millis(2000)), &s);
        assert!(!p99.passed);
        assert_eq!(p99.observed, Some(3000.0));
    }

    #[test]
    fn test_duration_bound_is_strict() {
        let s = stats(10, 0, &[(500, 10)]);
        let verdict = judge(&Threshold::duration(95, Duration::from_millis(500)), &s);
        assert!(!verdict.passed);
    }

    #[test]
    fn test_empty_run_passes_without_observation() {
        let verdicts = judge_all(
            &[
                Threshold::duration(95, Duration::from_millis(500)),
                Threshold::failed_rate(0.01),
            ],
            &RunStats::default(),
        );
        assert_eq!(verdicts.len(), 2);
        assert!(verdicts.iter().all(|v| v.passed && v.observed.is_none()));
    }

    #[test]
    fn test_record_times_merges_buckets() {
        let mut s = RunStats::default();
        s.record_times(120, 2);
        s.record_times(120, 3);
        s.record_times(80, 0);
        assert_eq!(s.response_times.get(&120), Some(&5));
        assert!(!s.response_times.contains_key(&80));
    }

    #[test]
    fn test_verdict_display() {
        let verdict = judge(&Threshold::failed_rate(0.1), &stats(0, 4, &[]));
        assert_eq!(
            verdict.to_string(),
            "✗ http_req_failed rate<0.1 (observed 1.0000)"
        );
        let verdict = judge(&Threshold::failed_rate(0.1), &RunStats::default());
        assert_eq!(verdict.to_string(), "✓ http_req_failed rate<0.1 (no samples)");
    }
}
