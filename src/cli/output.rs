//! Handles all user-facing output for the CLI besides the JSON itself.
//!
//! Summaries and failures go to stderr in color (when the terminal supports
//! it), keeping stdout for machine-readable output.

use std::io::Write;

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::cli::batch::BatchSummary;

/// Prints the result of a batch run.
pub fn print_summary(summary: &BatchSummary) {
    let mut stderr = StandardStream::stderr(ColorChoice::Auto);

    let _ = stderr.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true));
    let _ = write!(stderr, "converted");
    let _ = stderr.reset();
    let _ = writeln!(stderr, " {} file(s) -> {}", summary.converted, summary.json_path.display());

    if summary.failed.is_empty() {
        return;
    }
    let _ = stderr.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true));
    let _ = write!(stderr, "failed");
    let _ = stderr.reset();
    let _ = writeln!(
        stderr,
        "    {} file(s) -> {}",
        summary.failed.len(),
        summary.failed_path.display()
    );
    for (path, message) in &summary.failed {
        let _ = stderr.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)));
        let _ = write!(stderr, "  {path}");
        let _ = stderr.reset();
        let _ = writeln!(stderr, ": {message}");
    }
}

/// Prints a one-line error that is not tied to a source location.
pub fn print_failure(message: &str) {
    let mut stderr = StandardStream::stderr(ColorChoice::Auto);
    let _ = stderr.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true));
    let _ = write!(stderr, "error");
    let _ = stderr.reset();
    let _ = writeln!(stderr, ": {message}");
}
