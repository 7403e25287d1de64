use std::{fs, path::Path};

use tracing::debug;

use crate::{
    ast::Document,
    diagnostics::AstError,
    syntax::{parse_module, ParseOptions},
};

/// Name given to in-memory sources in diagnostics.
pub const STRING_SOURCE_NAME: &str = "<string>";

// ============================================================================
// CONVERSION PIPELINE
// ============================================================================

/// Converts Python source text into its AST document.
///
/// Empty input, or input holding only blank lines and comments, yields a
/// document whose single `Module` node has no body.
///
/// ```rust
/// let doc = astgen::parse_string("").unwrap();
/// assert_eq!(doc.to_json().unwrap(), r#"[{"type":"Module"}]"#);
/// ```
pub fn parse_string(source: &str) -> Result<Document, AstError> {
    parse_string_with(source, &ParseOptions::default())
}

/// [`parse_string`] with explicit options.
pub fn parse_string_with(source: &str, options: &ParseOptions) -> Result<Document, AstError> {
    convert(source, STRING_SOURCE_NAME, options)
}

/// Reads a file and converts its contents exactly as [`parse_string`] would.
///
/// A missing or unreadable file (including one that is not valid UTF-8) is
/// an [`AstError::Io`]; syntax errors name the file as their source.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Document, AstError> {
    let path = path.as_ref();
    let source = fs::read_to_string(path).map_err(|e| AstError::io(path, e))?;
    convert(&source, &path.display().to_string(), &ParseOptions::default())
}

fn convert(source: &str, name: &str, options: &ParseOptions) -> Result<Document, AstError> {
    debug!(source = name, bytes = source.len(), "parsing");
    let module = parse_module(source, options).map_err(|e| {
        debug!(source = name, error = %e, "syntax error");
        e.with_source(name, source)
    })?;
    debug!(source = name, statements = module.body.len(), "parsed");
    Ok(Document::new(module))
}
