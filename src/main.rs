// ABOUTME: Main entry point for firm-intake
//
// Binary: firm-intake
// Usage: firm-intake <COMMAND>
// - steps: list wizard steps
// - phases: show default phases for a challenge type
// - transform: flat form bag to nested payload
// - draft: show or clear the saved new-firm draft
// - submit: upload, transform and save a form bag

#![allow(missing_docs)]

use anyhow::Result;
use clap::Parser;
use firm_intake::config::AppConfig;

mod cli;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    let config = match &args.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };

    setup_logging(&config);
    setup_panic_handler();

    match args.command {
        cli::Commands::Steps => cli::inspect::steps(args.format),
        cli::Commands::Phases(phases_args) => cli::inspect::phases(phases_args, args.format),
        cli::Commands::Transform(transform_args) => cli::transform::execute(transform_args),
        cli::Commands::Draft { command } => cli::draft::execute(command, &config, args.format),
        cli::Commands::Submit(submit_args) => {
            cli::submit::execute(submit_args, &config, args.format).await
        }
    }
}

fn setup_logging(config: &AppConfig) {
    use std::fs::OpenOptions;
    use tracing_subscriber::prelude::*;

    let log_dir = AppConfig::log_dir();
    let _ = std::fs::create_dir_all(&log_dir);

    // JSONL log file with timestamp
    let log_file = log_dir.join(format!(
        "firm-intake-{}.jsonl",
        chrono::Local::now().format("%Y%m%d-%H%M%S")
    ));

    let file = match OpenOptions::new().create(true).append(true).open(&log_file) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Logging disabled, could not open {}: {}", log_file.display(), e);
            return;
        }
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_target(true)
                .with_writer(file)
                .with_ansi(false),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.filter.as_str().into()),
        )
        .init();
}

fn setup_panic_handler() {
    use tracing::error;

    std::panic::set_hook(Box::new(|panic_info| {
        error!("Application panicked: {}", panic_info);
        eprintln!("Application panicked: {}", panic_info);
        eprintln!("Please check the logs for more details.");
    }));
}
