//! # Load Scheduling
//!
//! [`LoadScheduler`] is the seam between the runner and whatever spins up virtual
//! users. The runner is handed over behind an `Arc` and called once per iteration;
//! ramping, pacing between stages, request metrics and the final report are the
//! scheduler's job.
//!
//! [`GooseRuntime`] is the production implementation. It registers one Goose scenario
//! whose transaction calls [`IterationRunner::run_iteration`] through a
//! [`GooseTransport`], and translates the scenario's stages into a Goose test plan:
//!
//! ```text
//! stress: 100,1m;200,2m;300,2m;400,2m;0,1m
//! ```
//!
//! Thresholds are logged when the attack starts. When it ends, Goose's request
//! metrics come back as [`RunStats`] for the caller to judge them with
//! [`verdict::judge_all`](crate::verdict::judge_all).

use anyhow::anyhow;
use goose::config::{GooseConfiguration, GooseDefaultType};
use goose::metrics::GooseMetrics;
use goose::prelude::{
    GooseAttack, GooseDefault, GooseError, GooseUser, Scenario as GooseScenario, Transaction,
    TransactionResult,
};
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::runner::IterationRunner;
use crate::scenario::Scenario;
use crate::transport::GooseTransport;
use crate::verdict::RunStats;

/// Capability that drives the runner across staged virtual users.
pub trait LoadScheduler {
    /// Run `scenario` to completion, calling the runner once per iteration, and
    /// return the aggregated request metrics.
    fn execute(
        &self,
        scenario: &Scenario,
        runner: Arc<IterationRunner>,
    ) -> impl Future<Output = anyhow::Result<RunStats>>;
}

/// Transactions registered on the Goose scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    /// Runs on every user once, before the iteration loop
    InvalidProbe,
    /// The iteration loop
    Iteration,
}

/// Goose-backed scheduler.
#[derive(Debug, Clone)]
pub struct GooseRuntime {
    host: String,
    probe_invalid: bool,
    report_file: Option<PathBuf>,
}

impl GooseRuntime {
    /// `host` is the base URL Goose reports against.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            probe_invalid: false,
            report_file: None,
        }
    }

    /// Run the invalid-payload prober once per virtual user when it starts.
    pub fn with_invalid_probe(mut self, enabled: bool) -> Self {
        self.probe_invalid = enabled;
        self
    }

    /// Write Goose's report (`.html`, `.json` or `.md`) to `path`.
    pub fn with_report_file(mut self, path: Option<PathBuf>) -> Self {
        self.report_file = path;
        self
    }

    fn steps(&self) -> Vec<Step> {
        let mut steps = Vec::with_capacity(2);
        if self.probe_invalid {
            steps.push(Step::InvalidProbe);
        }
        steps.push(Step::Iteration);
        steps
    }

    fn build_scenario(&self, runner: &Arc<IterationRunner>) -> GooseScenario {
        self.steps()
            .into_iter()
            .fold(GooseScenario::new("FavoriteNumber"), |scenario, step| {
                let transaction = match step {
                    Step::InvalidProbe => probe_transaction(Arc::clone(runner))
                        .set_name("invalid payloads")
                        .set_on_start(),
                    Step::Iteration => {
                        iteration_transaction(Arc::clone(runner)).set_name("favorite")
                    }
                };
                scenario.register_transaction(transaction)
            })
    }

    async fn attack(
        &self,
        test_plan: &str,
        runner: Arc<IterationRunner>,
    ) -> Result<GooseMetrics, GooseError> {
        let scenario = self.build_scenario(&runner);

        let mut attack = GooseAttack::initialize_with_config(GooseConfiguration::default())?
            .register_scenario(scenario)
            .set_default(GooseDefault::Host, self.host.as_str())?
            .set_default(GooseDefault::TestPlan, test_plan)?
            // Thresholds cover the ramp-up too.
            .set_default(GooseDefault::NoResetMetrics, true)?
            .set_default(GooseDefault::NoTelnet, true)?
            .set_default(GooseDefault::NoWebSocket, true)?;

        if let Some(path) = &self.report_file {
            let path = path.to_string_lossy();
            attack = attack.set_default(GooseDefault::ReportFile, path.as_ref())?;
        }

        attack.execute().await
    }
}

impl LoadScheduler for GooseRuntime {
    async fn execute(
        &self,
        scenario: &Scenario,
        runner: Arc<IterationRunner>,
    ) -> anyhow::Result<RunStats> {
        let test_plan = scenario.test_plan();
        info!(
            profile = %scenario.profile,
            host = %self.host,
            endpoint = runner.endpoint(),
            test_plan = %test_plan,
            peak_users = scenario.peak_users(),
            duration_secs = scenario.total_duration().as_secs(),
            probe_invalid = self.probe_invalid,
            "starting goose attack"
        );
        for threshold in &scenario.thresholds {
            info!(%threshold, "threshold");
        }

        let metrics = self
            .attack(&test_plan, runner)
            .await
            .map_err(|e| anyhow!("Goose attack failed: {e}"))?;

        let stats = RunStats::from_goose(&metrics);
        info!(
            profile = %scenario.profile,
            requests = stats.total_requests(),
            failures = stats.failures,
            "goose attack finished"
        );
        Ok(stats)
    }
}

async fn iterate(runner: Arc<IterationRunner>, user: &mut GooseUser) -> TransactionResult {
    let mut transport = GooseTransport::new(user);
    runner.run_iteration(&mut transport).await;
    Ok(())
}

async fn probe(runner: Arc<IterationRunner>, user: &mut GooseUser) -> TransactionResult {
    let mut transport = GooseTransport::new(user);
    runner.test_invalid_data(&mut transport).await;
    Ok(())
}

/// Transaction running one iteration on the current Goose user.
fn iteration_transaction(runner: Arc<IterationRunner>) -> Transaction {
    Transaction::new(Arc::new(move |user| {
        Box::pin(iterate(Arc::clone(&runner), user))
    }))
}

/// Transaction sending the four invalid payloads on the current Goose user.
fn probe_transaction(runner: Arc<IterationRunner>) -> Transaction {
    Transaction::new(Arc::new(move |user| {
        Box::pin(probe(Arc::clone(&runner), user))
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_builder() {
        let runtime = GooseRuntime::new("http://localhost:1323")
            .with_invalid_probe(true)
            .with_report_file(Some(PathBuf::from("report.html")));
        assert_eq!(runtime.host, "http://localhost:1323");
        assert!(runtime.probe_invalid);
        assert_eq!(runtime.report_file, Some(PathBuf::from("report.html")));
    }

    #[test]
    fn test_iteration_is_the_only_step_by_default() {
        let runtime = GooseRuntime::new("http://localhost:1323");
        assert_eq!(runtime.steps(), vec![Step::Iteration]);
    }

    #[test]
    fn test_probe_step_runs_first_when_enabled() {
        let runtime = GooseRuntime::new("http://localhost:1323").with_invalid_probe(true);
        assert_eq!(runtime.steps(), vec![Step::InvalidProbe, Step::Iteration]);
    }
}
