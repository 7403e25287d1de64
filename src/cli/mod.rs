//! The astgen Command-Line Interface.
//!
//! This module is the main entry point for all CLI commands and orchestrates
//! the core library functions.

use crate::cli::args::{AstgenArgs, Command};
use crate::diagnostics::print_error;
use crate::{logging, parse_file, parse_string, AstError, Document};
use clap::Parser;
use std::{path::Path, process};

pub mod args;
pub mod batch;
pub mod output;

/// Why a command failed, and the exit code it maps to.
#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Convert(#[from] AstError),
    /// Bad command-line input that clap cannot check.
    #[error("{0}")]
    Usage(String),
    #[error("cannot serialize AST: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl CliError {
    fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage(_) => 2,
            CliError::Convert(_) | CliError::Serialize(_) => 1,
        }
    }
}

/// The main entry point for the CLI.
pub fn run() {
    logging::init_tracing();
    let args = AstgenArgs::parse();

    // Dispatch to the appropriate subcommand handler.
    let result = match args.command {
        Command::File { path, pretty } => handle_file(&path, pretty),
        Command::String { source, pretty } => handle_string(&source, pretty),
        Command::Batch {
            root,
            output,
            pattern,
        } => handle_batch(&root, &output, &pattern),
    };

    if let Err(e) = result {
        let code = e.exit_code();
        match e {
            CliError::Convert(e) => print_error(e),
            other => output::print_failure(&other.to_string()),
        }
        process::exit(code);
    }
}

/// Handles the `file` subcommand.
fn handle_file(path: &Path, pretty: bool) -> Result<(), CliError> {
    let doc = parse_file(path)?;
    emit(&doc, pretty)
}

/// Handles the `string` subcommand.
fn handle_string(source: &str, pretty: bool) -> Result<(), CliError> {
    let doc = parse_string(source)?;
    emit(&doc, pretty)
}

/// Handles the `batch` subcommand. Per-file failures are reported in the
/// summary; only problems with the run itself are errors.
fn handle_batch(root: &Path, output: &Path, pattern: &str) -> Result<(), CliError> {
    let pattern = regex::Regex::new(pattern)
        .map_err(|e| CliError::Usage(format!("invalid --pattern: {e}")))?;
    let summary = batch::run_batch(root, output, &pattern)?;
    output::print_summary(&summary);
    Ok(())
}

fn emit(doc: &Document, pretty: bool) -> Result<(), CliError> {
    let json = if pretty {
        doc.to_json_pretty()?
    } else {
        doc.to_json()?
    };
    println!("{json}");
    Ok(())
}
