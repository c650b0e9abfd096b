//! Progress reporting for a hashing run
//!
//! Everything here draws on stderr so standard output stays reserved for
//! the document stream.

use crate::config::SaltConfig;
use crate::pipeline::{RunProgress, RunResult};
use console::style;
use humansize::{format_size, BINARY};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

/// Progress reporter that displays run status
pub struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    /// Create a new progress reporter
    pub fn new() -> Self {
        let bar = ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr());

        let spinner = ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");
        bar.set_style(spinner);
        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Update the progress display
    pub fn update(&self, progress: &RunProgress) {
        let msg = format!(
            "Decoded: {} | Hashed: {} | Unmodified: {} | Written: {} | Rate: {:.0}/s | Queue: {} | Workers: {}",
            format_number(progress.decoded),
            format_number(progress.hashed),
            format_number(progress.unmodified),
            format_number(progress.written),
            progress.docs_per_second(),
            progress.queued_jobs,
            progress.workers,
        );

        self.bar.set_message(msg);
    }

    /// Set a status message
    pub fn set_status(&self, status: &str) {
        self.bar.set_message(status.to_string());
    }

    /// Finish the progress display with a final message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Format a number with thousands separators
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let bytes: Vec<_> = s.bytes().rev().collect();

    let chunks: Vec<String> = bytes
        .chunks(3)
        .map(|chunk| chunk.iter().rev().map(|&b| b as char).collect::<String>())
        .collect();

    chunks.into_iter().rev().collect::<Vec<_>>().join(",")
}

/// Print a summary of the run results
pub fn print_summary(result: &RunResult, output: &str) {
    let duration_secs = result.duration.as_secs_f64();
    let rate = if duration_secs > 0.0 {
        result.written as f64 / duration_secs
    } else {
        0.0
    };

    let title = if result.completed {
        style("Run Complete").green().bold()
    } else {
        style("Run Stopped Early").yellow().bold()
    };

    eprintln!();
    eprintln!("{}", title);
    eprintln!("{}", style("─".repeat(50)).dim());
    eprintln!("  {} {}", style("Decoded:").bold(), format_number(result.decoded));
    eprintln!("  {} {}", style("Hashed:").bold(), format_number(result.hashed));
    eprintln!(
        "  {} {}",
        style("Unmodified:").bold(),
        format_number(result.passed_through)
    );
    eprintln!(
        "  {} {} computed, {} hits",
        style("Digests:").bold(),
        format_number(result.digests_computed),
        format_number(result.cache_hits)
    );
    eprintln!(
        "  {} {:.1}s ({:.0} docs/sec)",
        style("Duration:").bold(),
        duration_secs,
        rate
    );
    if result.path_errors > 0 {
        eprintln!(
            "  {} {}",
            style("Path errors:").yellow().bold(),
            format_number(result.path_errors)
        );
    }
    if result.encode_errors > 0 {
        eprintln!(
            "  {} {} (documents not written)",
            style("Encode errors:").red().bold(),
            format_number(result.encode_errors)
        );
    }
    if let Some(ref e) = result.decode_error {
        eprintln!("  {} {}", style("Decode error:").red().bold(), e);
    }
    eprintln!(
        "  {} {} ({})",
        style("Output:").bold(),
        output,
        format_size(result.bytes_written, BINARY)
    );
    eprintln!();
}

/// Print a header at the start of the run
pub fn print_header(config: &SaltConfig) {
    eprintln!();
    eprintln!(
        "{} {}",
        style("json-salt").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    eprintln!("{}", style("─".repeat(50)).dim());
    eprintln!("  {} {}", style("Input:").bold(), config.input.display());
    eprintln!("  {} {}", style("Key:").bold(), config.key_path);
    eprintln!("  {} {}", style("Workers:").bold(), config.worker_count);
    eprintln!("  {} {:?}", style("Cache:").bold(), config.cache_mode);
    eprintln!("  {} {}", style("Output:").bold(), config.output_display());
    eprintln!();
}
