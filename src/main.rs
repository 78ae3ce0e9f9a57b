use clap::Parser;
use favload::cli::{run_cli, Cli};
use favload::logging::{init_logging_with_config, LogConfig};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_config = LogConfig::from_env().with_verbosity(cli.verbose);
    let _log_guard = match init_logging_with_config(&log_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{e:#}");
            return ExitCode::FAILURE;
        }
    };

    match run_cli(cli).await {
        Ok(status) => status.into(),
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "favload failed");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
