//! json-salt - Salted Hashing for Streams of JSON Documents
//!
//! Entry point for the CLI application.

use anyhow::{Context, Result};
use clap::Parser;
use console::Term;
use json_salt::config::{CliArgs, SaltConfig};
use json_salt::error::ConfigError;
use json_salt::pipeline::RunCoordinator;
use json_salt::progress::{print_header, print_summary, ProgressReporter};
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let args = CliArgs::parse();

    setup_logging(args.verbose)?;

    let mut config = SaltConfig::from_args(args).context("Invalid configuration")?;
    config
        .resolve_salt(prompt_for_salt)
        .context("Failed to read salt")?;

    if config.show_progress {
        print_header(&config);
    }

    let output = config.output_display();
    let show_progress = config.show_progress;

    let mut coordinator = RunCoordinator::new(config)
        .context("Failed to initialize pipeline")?;

    if show_progress {
        let progress = ProgressReporter::new();
        progress.set_status("Reading input...");
        coordinator = coordinator.with_progress(progress);
    }

    let result = coordinator.run().context("Run failed")?;

    if show_progress {
        print_summary(&result, &output);
    }

    // A malformed document ends the stream early but is not a failed run
    if let Some(ref e) = result.decode_error {
        warn!(written = result.written, error = %e, "Input ended at a malformed document");
    } else {
        info!(written = result.written, "All documents written");
    }

    Ok(())
}

/// Read the salt from the terminal without echoing it
fn prompt_for_salt() -> std::result::Result<String, ConfigError> {
    let term = Term::stderr();
    term.write_str("Enter salt to hash with: ")
        .map_err(|e| ConfigError::SaltPrompt(e.to_string()))?;
    term.read_secure_line()
        .map_err(|e| ConfigError::SaltPrompt(e.to_string()))
}

fn setup_logging(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("json_salt=debug,warn")
    } else {
        EnvFilter::new("json_salt=info,warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    Ok(())
}
