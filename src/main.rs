//! projenv - conda/pip project environment automation CLI
//!
//! Resolves a project's conda environment, classifies its dependencies between conda and pip,
//! and runs the environment lifecycle and stub maintenance tasks.

use clap::Parser;
use projenv::cli::CliArgs;
use projenv::commands::Workflow;
use projenv::console::{default_log_dir, file_subscriber, Console};
use projenv::domain::Platform;
use projenv::engine::SystemRunner;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    let console = match build_console(&args) {
        Ok(console) => console,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // Run the main logic and handle errors
    match run(args, &console).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            console.error(&format!("Error: {:#}", e));
            ExitCode::FAILURE
        }
    }
}

/// Build the reporting context and install file logging when requested
fn build_console(args: &CliArgs) -> anyhow::Result<Console> {
    if args.log {
        let log_dir = default_log_dir()
            .ok_or_else(|| anyhow::anyhow!("unable to resolve the user data directory for logs"))?;
        tracing::subscriber::set_global_default(file_subscriber(&log_dir)?)?;
    }
    Ok(Console::new(args.verbose, args.quiet))
}

/// Main application logic
async fn run(args: CliArgs, console: &Console) -> anyhow::Result<()> {
    if args.verbose {
        console.info(&format!("projenv v{}", env!("CARGO_PKG_VERSION")));
        if let (true, Some(dir)) = (args.log, default_log_dir()) {
            console.info(&format!("Logging to {}", dir.display()));
        }
    }

    let platform = Platform::host()?;
    let runner = SystemRunner::with_timeout(args.probe_timeout);
    let workflow = Workflow::new(&runner, console, platform, &args.project)?;
    workflow.run(&args.command).await
}
