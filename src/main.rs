//! E2E Orchestrator - run end-to-end test tasks from a configuration file
//!
//! Executes every configured task for every test-data file, then exports
//! the merged reports.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use orchestrator::backend::ProcessExecutor;
use orchestrator::common::{logging, paths};
use orchestrator::{Config, Orchestrator};

#[derive(Parser)]
#[command(
    name = "e2e-orchestrator",
    about = "Run automated tests based on the YAML configuration"
)]
#[command(version, long_about = None)]
struct Cli {
    /// Path to the YAML configuration file
    config: PathBuf,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let _log_guard = logging::init(config.log_dir.as_deref());

    if config.tasks.is_empty() {
        tracing::warn!("Configuration declares no tasks; only report export will run");
    }

    let mut orchestrator = Orchestrator::new(&config, ProcessExecutor::new());
    let summary = orchestrator.run().await;
    summary.print();

    let summary_path = config.export_root.join(paths::SUMMARY_FILE_NAME);
    if let Err(e) = summary.write_json(&summary_path) {
        tracing::warn!("Could not write run summary: {}", e);
    }

    if config.strict_exit && summary.has_failures() {
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
