//! Batch conversion of a source tree into a JSON-lines dataset.
//!
//! For an output prefix `out`, writes:
//! - `out.json`: one compact document per line,
//! - `out.txt`: the relative path of each converted file, in the same order,
//! - `out_failed.txt`: the relative path of each file that failed.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::{parse_file, AstError};

/// Outcome of a batch run.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub converted: usize,
    /// Relative path and error message of every file that failed.
    pub failed: Vec<(String, String)>,
    pub json_path: PathBuf,
    pub list_path: PathBuf,
    pub failed_path: PathBuf,
}

/// Converts every file under `root` whose root-relative path matches
/// `pattern`. Files are visited in name order so runs are reproducible.
pub fn run_batch(root: &Path, prefix: &Path, pattern: &Regex) -> Result<BatchSummary, AstError> {
    fs::metadata(root).map_err(|e| AstError::io(root, e))?;

    let mut summary = BatchSummary {
        json_path: with_suffix(prefix, ".json"),
        list_path: with_suffix(prefix, ".txt"),
        failed_path: with_suffix(prefix, "_failed.txt"),
        ..BatchSummary::default()
    };
    let mut json = create(&summary.json_path)?;
    let mut list = create(&summary.list_path)?;
    let mut failed = create(&summary.failed_path)?;

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = relative_name(root, entry.path());
        if !pattern.is_match(&relative) {
            continue;
        }

        let line = parse_file(entry.path()).and_then(|doc| {
            doc.to_json().map_err(|e| {
                AstError::io(entry.path(), std::io::Error::new(std::io::ErrorKind::InvalidData, e))
            })
        });
        match line {
            Ok(line) => {
                write_line(&mut json, &summary.json_path, &line)?;
                write_line(&mut list, &summary.list_path, &relative)?;
                summary.converted += 1;
            }
            Err(e) => {
                warn!(file = %relative, error = %e, "conversion failed");
                write_line(&mut failed, &summary.failed_path, &relative)?;
                summary.failed.push((relative, e.to_string()));
            }
        }
    }

    for (writer, path) in [
        (&mut json, &summary.json_path),
        (&mut list, &summary.list_path),
        (&mut failed, &summary.failed_path),
    ] {
        writer.flush().map_err(|e| AstError::io(path, e))?;
    }
    info!(
        converted = summary.converted,
        failed = summary.failed.len(),
        "batch finished"
    );
    Ok(summary)
}

/// `prefix` with `suffix` appended to its final component.
fn with_suffix(prefix: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(prefix.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// Path relative to `root`, with `/` separators.
fn relative_name(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn create(path: &Path) -> Result<BufWriter<File>, AstError> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|e| AstError::io(path, e))
}

fn write_line(writer: &mut BufWriter<File>, path: &Path, line: &str) -> Result<(), AstError> {
    writeln!(writer, "{line}").map_err(|e| AstError::io(path, e))
}
