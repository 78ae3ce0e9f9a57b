use dashmap::DashMap;
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

use crate::transport::Exchange;

pub const STATUS_IS_200: &str = "status is 200";
pub const RESPONSE_UNDER_500MS: &str = "response time < 500ms";
pub const RESPONSE_UNDER_1000MS: &str = "response time < 1000ms";
pub const INVALID_RETURNS_400: &str = "invalid request returns 400";

/// Named boolean assertion over a single [`Exchange`].
///
/// Checks never abort an iteration; their outcome is only recorded.
#[derive(Clone, Copy)]
pub struct Check {
    pub name: &'static str,
    predicate: fn(&Exchange) -> bool,
}

impl Check {
    pub const fn new(name: &'static str, predicate: fn(&Exchange) -> bool) -> Self {
        Self { name, predicate }
    }

    /// Evaluate against an exchange. A transport failure fails every check.
    pub fn evaluate(&self, exchange: &Exchange) -> CheckOutcome {
        let passed = !exchange.is_transport_failure() && (self.predicate)(exchange);
        CheckOutcome {
            name: self.name,
            passed,
        }
    }
}

impl fmt::Debug for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Check").field("name", &self.name).finish()
    }
}

/// Checks applied to every valid iteration, in evaluation order.
pub const ITERATION_CHECKS: [Check; 3] = [
    Check::new(STATUS_IS_200, |ex| ex.status == 200),
    Check::new(RESPONSE_UNDER_500MS, |ex| ex.elapsed < Duration::from_millis(500)),
    Check::new(RESPONSE_UNDER_1000MS, |ex| ex.elapsed < Duration::from_millis(1000)),
];

/// Check applied to each invalid-payload probe.
pub const INVALID_REQUEST_CHECK: Check = Check::new(INVALID_RETURNS_400, |ex| ex.status == 400);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckOutcome {
    pub name: &'static str,
    pub passed: bool,
}

/// Sink for check outcomes, shared by every virtual user.
pub trait CheckRecorder: Send + Sync {
    fn record(&self, outcome: &CheckOutcome);
}

#[derive(Debug, Default)]
struct CheckTally {
    passes: AtomicU64,
    failures: AtomicU64,
}

/// In-memory recorder keeping pass/fail counters per check name.
///
/// Counters use relaxed atomics inside a `DashMap`, so recording from many Goose users
/// never takes a global lock.
#[derive(Debug, Default)]
pub struct CheckLedger {
    tallies: DashMap<&'static str, CheckTally>,
}

impl CheckLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pass/fail counts for one check, if it was ever recorded.
    pub fn tally(&self, name: &str) -> Option<CheckSummary> {
        self.tallies.get(name).map(|entry| summarize(entry.key(), entry.value()))
    }

    /// All tallies, sorted by check name.
    pub fn summaries(&self) -> Vec<CheckSummary> {
        let mut out: Vec<CheckSummary> = self
            .tallies
            .iter()
            .map(|entry| summarize(entry.key(), entry.value()))
            .collect();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        out
    }

    /// Total outcomes recorded across all checks.
    pub fn total(&self) -> u64 {
        self.summaries().iter().map(|s| s.total()).sum()
    }

    /// `true` when nothing has failed (vacuously true when empty).
    pub fn all_passed(&self) -> bool {
        self.summaries().iter().all(|s| s.failures == 0)
    }
}

impl CheckRecorder for CheckLedger {
    fn record(&self, outcome: &CheckOutcome) {
        let tally = self.tallies.entry(outcome.name).or_default();
        if outcome.passed {
            tally.passes.fetch_add(1, Ordering::Relaxed);
        } else {
            tally.failures.fetch_add(1, Ordering::Relaxed);
            debug!(check = outcome.name, "check failed");
        }
    }
}

fn summarize(name: &str, tally: &CheckTally) -> CheckSummary {
    CheckSummary {
        name: name.to_string(),
        passes: tally.passes.load(Ordering::Relaxed),
        failures: tally.failures.load(Ordering::Relaxed),
    }
}

/// Point-in-time counters for one named check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckSummary {
    pub name: String,
    pub passes: u64,
    pub failures: u64,
}

impl CheckSummary {
    pub fn total(&self) -> u64 {
        self.passes + self.failures
    }

    /// Fraction of passing outcomes, `0.0` when nothing was recorded.
    pub fn pass_rate(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.passes as f64 / total as f64,
        }
    }
}

impl fmt::Display for CheckSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = if self.failures == 0 { "✓" } else { "✗" };
        write!(
            f,
            "{} {:<30} {:>6.2}%  ✓ {:<8} ✗ {}",
            mark,
            self.name,
            self.pass_rate() * 100.0,
            self.passes,
            self.failures
        )
    }
}
