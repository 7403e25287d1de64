//! Defines the command-line arguments and subcommands for the astgen CLI.
//!
//! This module uses the `clap` crate with its "derive" feature to create a
//! declarative and type-safe argument parsing structure.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "astgen",
    version,
    about = "Convert Python source into a JSON abstract syntax tree."
)]
pub struct AstgenArgs {
    #[command(subcommand)]
    pub command: Command,
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the AST of a Python file as JSON.
    File {
        /// The path to the Python file to convert.
        #[arg(required = true)]
        path: PathBuf,
        /// Indent the JSON output.
        #[arg(long)]
        pretty: bool,
    },
    /// Print the AST of an inline Python snippet as JSON.
    String {
        /// The Python source text.
        #[arg(required = true)]
        source: String,
        /// Indent the JSON output.
        #[arg(long)]
        pretty: bool,
    },
    /// Convert every matching file under a directory into a JSON-lines dataset.
    Batch {
        /// The directory to walk.
        #[arg(required = true)]
        root: PathBuf,
        /// Output prefix; writes `<PREFIX>.json`, `<PREFIX>.txt` and `<PREFIX>_failed.txt`.
        #[arg(short, long)]
        output: PathBuf,
        /// Regex matched against each file's path relative to the root.
        #[arg(long, default_value = r"\.py$")]
        pattern: String,
    },
}
