//! # favload
//!
//! **favload** runs staged load scenarios (smoke, load, stress, spike) against the
//! favorite-number API's `POST /api/v1/favorite` endpoint, sending randomized JSON
//! payloads and checking response status and latency.
//!
//! ## Architecture
//!
//! - **[`scenario`]** - Profile catalogue: ramp stages and thresholds
//! - **[`payload`]** - Valid random payloads and the fixed invalid set
//! - **[`transport`]** - POST capability: Goose user or standalone `reqwest`
//! - **[`check`]** - Named checks and the concurrent check ledger
//! - **[`runner`]** - One iteration / one invalid-payload probe
//! - **[`scheduler`]** - Goose-backed virtual-user scheduling
//! - **[`verdict`]** - Threshold judgement over the run's request metrics
//! - **[`config`]** - Environment-derived run configuration
//! - **[`logging`]** - Structured `tracing` setup
//! - **[`cli`]** - `favload` command-line entry points
//!
//! ### Run Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant CLI as favload run
//!     participant Goose as GooseRuntime
//!     participant Runner as IterationRunner
//!     participant API as /api/v1/favorite
//!
//!     CLI->>Goose: execute(profile.scenario(), runner)
//!     Goose->>Goose: test plan "100,1m;200,2m;..."
//!     loop every virtual user
//!         Goose->>Runner: run_iteration(GooseTransport)
//!         Runner->>API: POST {userId, favNum}
//!         API-->>Runner: status + timing
//!         Runner->>Runner: record 3 checks, sleep 100ms
//!     end
//!     Goose-->>CLI: RunStats
//!     CLI->>CLI: print check summary, judge thresholds
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use favload::check::CheckLedger;
//! use favload::config::LoadTestConfig;
//! use favload::runner::IterationRunner;
//! use favload::transport::HttpTransport;
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let config = LoadTestConfig::from_env()?;
//! let ledger = Arc::new(CheckLedger::new());
//! let runner = IterationRunner::new(&config, Arc::<CheckLedger>::clone(&ledger));
//! let mut transport = HttpTransport::new(config.request_timeout)?;
//!
//! for outcome in runner.run_iteration(&mut transport).await {
//!     println!("{}: {}", outcome.name, outcome.passed);
//! }
//! # Ok(())
//! # }
//! ```

pub mod check;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod payload;
pub mod runner;
pub mod scenario;
pub mod scheduler;
pub mod transport;
pub mod verdict;

pub use check::{CheckLedger, CheckOutcome, CheckRecorder};
pub use config::LoadTestConfig;
pub use error::ConfigError;
pub use runner::IterationRunner;
pub use scenario::{Profile, Scenario, Stage, Threshold};
pub use scheduler::{GooseRuntime, LoadScheduler};
pub use verdict::{RunStats, ThresholdVerdict};
