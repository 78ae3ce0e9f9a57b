use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use std::fmt::Write as _;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{info, warn};

use crate::check::{CheckLedger, CheckOutcome};
use crate::config::LoadTestConfig;
use crate::runner::IterationRunner;
use crate::scenario::{Profile, Scenario};
use crate::scheduler::{GooseRuntime, LoadScheduler};
use crate::transport::HttpTransport;
use crate::verdict::{judge_all, ThresholdVerdict};

/// Command-line interface for favload
#[derive(Parser)]
#[command(name = "favload")]
#[command(about = "Load tests for the favorite-number API", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Run a staged scenario through Goose
    Run {
        /// Scenario to run (default: FAVLOAD_PROFILE, then stress)
        #[arg(short, long, value_enum)]
        profile: Option<Profile>,

        /// Target base URL (default: BASE_URL, then http://localhost:1323)
        #[arg(long)]
        base_url: Option<String>,

        /// Send the four invalid payloads once per virtual user at start-up
        #[arg(long, default_value_t = false)]
        probe_invalid: bool,

        /// Write the Goose report to this file (.html, .json or .md)
        #[arg(long)]
        report_file: Option<PathBuf>,
    },
    /// Run a single iteration and print the check outcomes
    Once {
        /// Target base URL (default: BASE_URL, then http://localhost:1323)
        #[arg(long)]
        base_url: Option<String>,
    },
    /// Send the four invalid payloads and expect 400 for each
    Probe {
        /// Target base URL (default: BASE_URL, then http://localhost:1323)
        #[arg(long)]
        base_url: Option<String>,
    },
    /// Print the stages, Goose test plan and thresholds of a profile
    Plan {
        /// Profile to show (default: all)
        #[arg(short, long, value_enum)]
        profile: Option<Profile>,

        /// Output format
        #[arg(long, value_enum, default_value_t = PlanFormat::Text)]
        format: PlanFormat,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PlanFormat {
    Text,
    Json,
}

/// Result of a command that completed without an operational error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Passed,
    /// A one-shot check failed or a run breached a threshold
    Failed,
}

impl RunStatus {
    fn from_passed(passed: bool) -> Self {
        if passed {
            RunStatus::Passed
        } else {
            RunStatus::Failed
        }
    }
}

impl From<RunStatus> for ExitCode {
    fn from(status: RunStatus) -> Self {
        match status {
            RunStatus::Passed => ExitCode::SUCCESS,
            RunStatus::Failed => ExitCode::FAILURE,
        }
    }
}

/// Execute a parsed command line.
///
/// `once` and `probe` fail when any check failed, `run` fails when any threshold of
/// the scenario was breached.
pub async fn run_cli(cli: Cli) -> anyhow::Result<RunStatus> {
    match cli.command {
        Commands::Run {
            profile,
            base_url,
            probe_invalid,
            report_file,
        } => {
            let config = resolve_config(base_url.as_deref(), profile)?;
            let ledger = Arc::new(CheckLedger::new());
            let runner = Arc::new(IterationRunner::new(&config, Arc::<CheckLedger>::clone(&ledger)));
            let scenario = config.profile.scenario();

            let stats = GooseRuntime::new(config.base_url.as_str())
                .with_invalid_probe(probe_invalid)
                .with_report_file(report_file)
                .execute(&scenario, runner)
                .await?;

            print_summary(&ledger);
            let verdicts = judge_all(&scenario.thresholds, &stats);
            print_verdicts(&verdicts);
            Ok(thresholds_status(&verdicts))
        }
        Commands::Once { base_url } => {
            let config = resolve_config(base_url.as_deref(), None)?;
            let (runner, ledger) = standalone_runner(&config);
            let mut transport = HttpTransport::new(config.request_timeout)?;

            info!(endpoint = runner.endpoint(), "running single iteration");
            let outcomes = runner.run_iteration(&mut transport).await;
            print_outcomes(&outcomes);
            Ok(checks_status(&ledger))
        }
        Commands::Probe { base_url } => {
            let config = resolve_config(base_url.as_deref(), None)?;
            let (runner, ledger) = standalone_runner(&config);
            let mut transport = HttpTransport::new(config.request_timeout)?;

            info!(endpoint = runner.endpoint(), "probing with invalid payloads");
            let outcomes = runner.test_invalid_data(&mut transport).await;
            print_outcomes(&outcomes);
            Ok(checks_status(&ledger))
        }
        Commands::Plan { profile, format } => {
            let scenarios: Vec<Scenario> = match profile {
                Some(p) => vec![p.scenario()],
                None => Profile::ALL.iter().map(|p| p.scenario()).collect(),
            };
            match format {
                PlanFormat::Text => {
                    for scenario in &scenarios {
                        print!("{}", render_plan(scenario));
                    }
                }
                PlanFormat::Json => {
                    let json = serde_json::to_string_pretty(&scenarios)
                        .context("Failed to serialize scenarios")?;
                    println!("{json}");
                }
            }
            Ok(RunStatus::Passed)
        }
    }
}

/// Environment first, then CLI overrides.
pub(crate) fn resolve_config(
    base_url: Option<&str>,
    profile: Option<Profile>,
) -> anyhow::Result<LoadTestConfig> {
    let mut config = LoadTestConfig::from_env().context("Invalid environment configuration")?;
    if let Some(url) = base_url {
        config = config.with_base_url(url).context("Invalid --base-url")?;
    }
    if let Some(profile) = profile {
        config = config.with_profile(profile);
    }
    Ok(config)
}

fn standalone_runner(config: &LoadTestConfig) -> (IterationRunner, Arc<CheckLedger>) {
    let ledger = Arc::new(CheckLedger::new());
    let runner = IterationRunner::new(config, Arc::<CheckLedger>::clone(&ledger));
    (runner, ledger)
}

pub(crate) fn checks_status(ledger: &CheckLedger) -> RunStatus {
    RunStatus::from_passed(ledger.all_passed())
}

pub(crate) fn thresholds_status(verdicts: &[ThresholdVerdict]) -> RunStatus {
    let breached: Vec<&ThresholdVerdict> = verdicts.iter().filter(|v| !v.passed).collect();
    for verdict in &breached {
        warn!(
            threshold = %verdict.threshold,
            observed = ?verdict.observed,
            "threshold breached"
        );
    }
    RunStatus::from_passed(breached.is_empty())
}

fn print_outcomes(outcomes: &[CheckOutcome]) {
    for outcome in outcomes {
        let mark = if outcome.passed { "✓" } else { "✗" };
        println!("{mark} {}", outcome.name);
    }
}

fn print_summary(ledger: &CheckLedger) {
    let summaries = ledger.summaries();
    if summaries.is_empty() {
        println!("No checks recorded.");
        return;
    }
    println!();
    println!("Checks ({} outcomes):", ledger.total());
    for summary in summaries {
        println!("  {summary}");
    }
}

fn print_verdicts(verdicts: &[ThresholdVerdict]) {
    if verdicts.is_empty() {
        println!("No thresholds for this profile.");
        return;
    }
    println!();
    println!("Thresholds:");
    for verdict in verdicts {
        println!("  {verdict}");
    }
}

/// Human-readable description of one scenario.
pub(crate) fn render_plan(scenario: &Scenario) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} ({}s, peak {} users)",
        scenario.profile,
        scenario.total_duration().as_secs(),
        scenario.peak_users()
    );
    for (i, stage) in scenario.stages.iter().enumerate() {
        let _ = writeln!(
            out,
            "  stage {}: {:>4}s -> {} users",
            i + 1,
            stage.duration.as_secs(),
            stage.target
        );
    }
    let _ = writeln!(out, "  goose test plan: {}", scenario.test_plan());
    if scenario.thresholds.is_empty() {
        let _ = writeln!(out, "  thresholds: none");
    } else {
        for threshold in &scenario.thresholds {
            let _ = writeln!(out, "  threshold: {threshold}");
        }
    }
    out
}
