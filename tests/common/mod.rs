//! Shared fixture helpers for the integration tests.
//!
//! Sources live in `tests/fixtures/sources/<name>.py` and the trees they
//! must produce in `tests/fixtures/expected/<name>.json`.

#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;

use difference::{Changeset, Difference};
use serde_json::Value;

pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures")
}

pub fn source_path(name: &str) -> PathBuf {
    fixtures_dir().join("sources").join(format!("{name}.py"))
}

pub fn read_source(name: &str) -> String {
    fs::read_to_string(source_path(name)).unwrap_or_else(|e| panic!("cannot read fixture {name}: {e}"))
}

/// Loads the expected node sequence for a fixture.
pub fn load_expected(name: &str) -> Vec<Value> {
    let path = fixtures_dir().join("expected").join(format!("{name}.json"));
    let text = fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()));
    serde_json::from_str(&text).unwrap_or_else(|e| panic!("invalid JSON in {}: {e}", path.display()))
}

/// Asserts equality of two node sequences, printing a line diff of their
/// pretty JSON on mismatch.
pub fn assert_nodes_eq(actual: &[Value], expected: &[Value]) {
    if actual == expected {
        return;
    }
    let actual = serde_json::to_string_pretty(actual).unwrap_or_default();
    let expected = serde_json::to_string_pretty(expected).unwrap_or_default();
    let changeset = Changeset::new(&expected, &actual, "\n");
    let mut report = String::new();
    for diff in &changeset.diffs {
        match diff {
            Difference::Same(text) => {
                for line in text.lines() {
                    report.push_str(&format!("  {line}\n"));
                }
            }
            Difference::Add(text) => {
                for line in text.lines() {
                    report.push_str(&format!("+ {line}\n"));
                }
            }
            Difference::Rem(text) => {
                for line in text.lines() {
                    report.push_str(&format!("- {line}\n"));
                }
            }
        }
    }
    panic!("AST mismatch (- expected, + actual):\n{report}");
}

/// Checks that every mapping in the tree carries a non-empty string `type`,
/// returning the path of the first offender.
pub fn find_untyped_node(value: &Value, path: &str) -> Option<String> {
    match value {
        Value::Object(map) => {
            match map.get("type") {
                Some(Value::String(t)) if !t.is_empty() => {}
                _ => return Some(path.to_string()),
            }
            map.iter()
                .find_map(|(key, child)| find_untyped_node(child, &format!("{path}.{key}")))
        }
        Value::Array(items) => items
            .iter()
            .enumerate()
            .find_map(|(i, child)| find_untyped_node(child, &format!("{path}[{i}]"))),
        _ => None,
    }
}
