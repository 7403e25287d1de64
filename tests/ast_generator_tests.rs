// tests/ast_generator_tests.rs

mod common;

use astgen::{parse_file, parse_string, ErrorType};
use common::{assert_nodes_eq, find_untyped_node, load_expected, read_source, source_path};
use serde_json::json;

// ---
// Fixture comparisons
// ---

#[test]
fn empty_source_is_a_bare_module() {
    let doc = parse_string("").unwrap();
    assert_eq!(doc.to_value(), vec![json!({"type": "Module"})]);
    assert_eq!(doc.to_json().unwrap(), r#"[{"type":"Module"}]"#);
}

#[test]
fn parse_string_matches_fixture() {
    let source = read_source("parse_python");
    let doc = parse_string(&source).unwrap();
    assert_nodes_eq(&doc.to_value(), &load_expected("parse_python"));
}

#[test]
fn parse_file_matches_fixtures() {
    for name in ["simple", "parse_python"] {
        let doc = parse_file(source_path(name)).unwrap();
        assert_nodes_eq(&doc.to_value(), &load_expected(name));
    }
}

// ---
// Properties
// ---

#[test]
fn parse_file_equals_parse_string_on_contents() {
    for name in ["simple", "parse_python"] {
        let from_file = parse_file(source_path(name)).unwrap();
        let from_text = parse_string(&read_source(name)).unwrap();
        assert_eq!(from_file, from_text);
    }
}

#[test]
fn conversion_is_deterministic() {
    let source = read_source("parse_python");
    let first = parse_string(&source).unwrap().to_json().unwrap();
    let second = parse_string(&source).unwrap().to_json().unwrap();
    assert_eq!(first, second);
}

#[test]
fn every_node_has_a_type() {
    let doc = parse_string(&read_source("parse_python")).unwrap();
    for (i, node) in doc.to_value().iter().enumerate() {
        assert_eq!(find_untyped_node(node, &format!("[{i}]")), None);
    }
}

#[test]
fn missing_file_is_an_io_error() {
    let err = parse_file("/definitely/not/here.py").unwrap_err();
    assert_eq!(err.error_type(), ErrorType::Io);
    assert!(err.to_string().starts_with("IOError"));
}

#[test]
fn invalid_text_is_a_syntax_error() {
    for source in ["x = = 1", "def f(:\n    pass", "if x\n    pass\n", "1 +"] {
        let err = parse_string(source).unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Syntax, "source: {source:?}");
    }
}

#[test]
fn syntax_errors_in_files_name_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.py");
    std::fs::write(&path, "x = (\n").unwrap();
    let err = parse_file(&path).unwrap_err();
    assert!(err.is_syntax());
    let report = format!("{:?}", miette::Report::new(err));
    assert!(report.contains("broken.py"), "report was: {report}");
}

#[test]
fn non_utf8_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("latin1.py");
    std::fs::write(&path, b"s = '\xe9'\n").unwrap();
    assert!(parse_file(&path).unwrap_err().is_io());
}
