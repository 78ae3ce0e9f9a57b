//! # CLI Module
//!
//! Command-line entry points for the `favload` binary.
//!
//! ## Commands
//!
//! ### `run`
//!
//! Drive a staged scenario through Goose against the favorite endpoint:
//!
//! ```bash
//! favload run --profile stress --base-url http://localhost:1323
//! ```
//!
//! Options:
//! - `--profile <PROFILE>` - `smoke`, `load`, `stress` or `spike` (default: stress)
//! - `--base-url <URL>` - Target service (default: `BASE_URL`, then `http://localhost:1323`)
//! - `--probe-invalid` - Send the invalid payloads once per virtual user at start-up
//! - `--report-file <FILE>` - Goose report output (`.html`, `.json`, `.md`)
//!
//! Once Goose finishes, every threshold of the profile is judged against the
//! collected request metrics. Any breach exits `1`.
//!
//! ### `once`
//!
//! Send one valid iteration with a plain HTTP client and print the three checks.
//! Exits `1` when any of them failed.
//!
//! ### `probe`
//!
//! Send the four invalid payloads and expect `400` for each. Exits `1` on any failure,
//! which makes it usable as a CI gate for request validation.
//!
//! ### `plan`
//!
//! Print the stages, the Goose test plan and the thresholds of one or all profiles:
//!
//! ```bash
//! favload plan --profile spike
//! favload plan --format json
//! ```

mod commands;


pub use commands::{run_cli, Cli, Commands, PlanFormat, RunStatus};
