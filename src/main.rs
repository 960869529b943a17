use clap::Parser;
use kube_pull_secrets::cli::{Args, Runner};
use kube_pull_secrets::{OutputManager, logging};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let runner = match Runner::new(args) {
        Ok(runner) => runner,
        Err(e) => {
            OutputManager::new(false).error(&e.to_string());
            return ExitCode::FAILURE;
        }
    };
    let output = runner.output();

    if let Err(e) = logging::init(runner.config().verbose, output.is_quiet()) {
        output.error(&e.to_string());
        return ExitCode::FAILURE;
    }

    if let Err(e) = runner.run().await {
        tracing::debug!(error = ?e, "command failed");
        output.error(&e.to_string());
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
