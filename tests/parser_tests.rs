// tests/parser_tests.rs

use astgen::{parse_string, parse_string_with, AstError, ParseOptions};
use serde_json::{json, Value};

// A helper to get the first statement of a parsed module as JSON.
fn first_stmt(source: &str) -> Value {
    let doc = parse_string(source).unwrap_or_else(|e| panic!("{source:?} failed: {e}"));
    doc.to_value()[0]["body"][0].clone()
}

// A helper to get the expression of a single expression statement.
fn expr(source: &str) -> Value {
    first_stmt(source)["value"].clone()
}

fn syntax_message(source: &str) -> String {
    match parse_string(source) {
        Err(AstError::Syntax { message, .. }) => message,
        other => panic!("expected a syntax error for {source:?}, got {other:?}"),
    }
}

fn name(id: &str, ctx: &str) -> Value {
    json!({"type": "Name", "id": id, "ctx": {"type": ctx}})
}

fn int(value: u64) -> Value {
    json!({"type": "Constant", "value": value, "kind": "int"})
}

// ---
// Expressions
// ---

#[test]
fn test_operator_precedence() {
    assert_eq!(
        expr("a + b * -c ** 2"),
        json!({
            "type": "BinOp",
            "left": name("a", "Load"),
            "op": {"type": "Add"},
            "right": {
                "type": "BinOp",
                "left": name("b", "Load"),
                "op": {"type": "Mult"},
                "right": {
                    "type": "UnaryOp",
                    "op": {"type": "USub"},
                    "operand": {
                        "type": "BinOp",
                        "left": name("c", "Load"),
                        "op": {"type": "Pow"},
                        "right": int(2)
                    }
                }
            }
        })
    );
}

#[test]
fn test_boolean_operators_flatten() {
    assert_eq!(
        expr("a or b or not c"),
        json!({
            "type": "BoolOp",
            "op": {"type": "Or"},
            "values": [
                name("a", "Load"),
                name("b", "Load"),
                {"type": "UnaryOp", "op": {"type": "Not"}, "operand": name("c", "Load")}
            ]
        })
    );
}

#[test]
fn test_chained_comparison() {
    assert_eq!(
        expr("a < b not in c"),
        json!({
            "type": "Compare",
            "left": name("a", "Load"),
            "ops": [{"type": "Lt"}, {"type": "NotIn"}],
            "comparators": [name("b", "Load"), name("c", "Load")]
        })
    );
}

#[test]
fn test_conditional_expression_and_walrus() {
    assert_eq!(
        expr("(y := a if b else c)"),
        json!({
            "type": "NamedExpr",
            "target": name("y", "Store"),
            "value": {
                "type": "IfExp",
                "test": name("b", "Load"),
                "body": name("a", "Load"),
                "orelse": name("c", "Load")
            }
        })
    );
}

#[test]
fn test_call_arguments() {
    assert_eq!(
        expr("f(a, *b, c=1, **d)"),
        json!({
            "type": "Call",
            "func": name("f", "Load"),
            "args": [
                name("a", "Load"),
                {"type": "Starred", "value": name("b", "Load"), "ctx": {"type": "Load"}}
            ],
            "keywords": [
                {"type": "keyword", "arg": "c", "value": int(1)},
                {"type": "keyword", "value": name("d", "Load")}
            ]
        })
    );
}

#[test]
fn test_bare_generator_argument() {
    let call = expr("sum(x for x in xs)");
    assert_eq!(call["args"][0]["type"], "GeneratorExp");
}

#[test]
fn test_displays() {
    assert_eq!(expr("()"), json!({"type": "Tuple", "ctx": {"type": "Load"}}));
    assert_eq!(expr("[]"), json!({"type": "List", "ctx": {"type": "Load"}}));
    assert_eq!(expr("{}"), json!({"type": "Dict"}));
    assert_eq!(
        expr("(1,)"),
        json!({"type": "Tuple", "elts": [int(1)], "ctx": {"type": "Load"}})
    );
    assert_eq!(expr("{1, 2}"), json!({"type": "Set", "elts": [int(1), int(2)]}));
    assert_eq!(
        expr("{'a': 1, **b}"),
        json!({
            "type": "Dict",
            "keys": [{"type": "Constant", "value": "a", "kind": "str"}, null],
            "values": [int(1), name("b", "Load")]
        })
    );
}

#[test]
fn test_comprehensions() {
    assert_eq!(expr("{k: v for k, v in items}")["type"], "DictComp");
    assert_eq!(expr("{x for x in xs}")["type"], "SetComp");
    let gen = expr("(x async for x in xs)");
    assert_eq!(gen["type"], "GeneratorExp");
    assert_eq!(gen["generators"][0]["is_async"], true);
    assert_eq!(gen["generators"][0]["target"], name("x", "Store"));
}

#[test]
fn test_subscripts_and_slices() {
    assert_eq!(
        expr("a[1:2, ::3]")["slice"],
        json!({
            "type": "Tuple",
            "elts": [
                {"type": "Slice", "lower": int(1), "upper": int(2)},
                {"type": "Slice", "step": int(3)}
            ],
            "ctx": {"type": "Load"}
        })
    );
    assert_eq!(expr("a[i]")["slice"], name("i", "Load"));
}

#[test]
fn test_literals() {
    assert_eq!(expr("0x_ff")["value"], 255);
    assert_eq!(expr("1.5e3")["value"], 1500.0);
    assert_eq!(expr("2j"), json!({"type": "Constant", "value": 2.0, "kind": "complex"}));
    assert_eq!(expr("..."), json!({"type": "Constant", "value": null, "kind": "Ellipsis"}));
    assert_eq!(expr("None"), json!({"type": "Constant", "value": null, "kind": "None"}));
    assert_eq!(expr("True")["value"], true);
    assert_eq!(expr("b'\\x00a'"), json!({"type": "Constant", "value": "\u{0}a", "kind": "bytes"}));
    assert_eq!(expr("'tab\\there'")["value"], "tab\there");
    assert_eq!(expr("r'\\d+'")["value"], "\\d+");
    assert_eq!(
        expr("123456789012345678901234567890")["value"],
        "123456789012345678901234567890"
    );
}

#[test]
fn test_lambda_parameters() {
    assert_eq!(
        expr("lambda a, /, b, *, c=1, **k: 0")["args"],
        json!({
            "type": "arguments",
            "posonlyargs": [{"type": "arg", "arg": "a"}],
            "args": [{"type": "arg", "arg": "b"}],
            "kwonlyargs": [{"type": "arg", "arg": "c"}],
            "kw_defaults": [int(1)],
            "kwarg": {"type": "arg", "arg": "k"}
        })
    );
}

#[test]
fn test_keyword_only_without_default_is_null() {
    let args = first_stmt("def f(*, a, b=2): pass")["args"].clone();
    assert_eq!(args["kw_defaults"], json!([null, int(2)]));
}

#[test]
fn test_await_and_yield() {
    let body = &first_stmt("async def f():\n    await g()\n    yield\n    yield from h\n")["body"];
    assert_eq!(body[0]["value"]["type"], "Await");
    assert_eq!(body[1]["value"], json!({"type": "Yield"}));
    assert_eq!(body[2]["value"]["type"], "YieldFrom");
}

// ---
// Statements
// ---

#[test]
fn test_chained_assignment() {
    assert_eq!(
        first_stmt("a = b = 1"),
        json!({
            "type": "Assign",
            "targets": [name("a", "Store"), name("b", "Store")],
            "value": int(1)
        })
    );
}

#[test]
fn test_annotated_assignment_simple_flag() {
    assert_eq!(first_stmt("x: int")["simple"], true);
    assert_eq!(first_stmt("(x): int = 1")["simple"], false);
    assert_eq!(first_stmt("a.b: int")["simple"], false);
}

#[test]
fn test_del_targets() {
    assert_eq!(
        first_stmt("del a, b[0]"),
        json!({
            "type": "Delete",
            "targets": [
                name("a", "Del"),
                {"type": "Subscript", "value": name("b", "Load"), "slice": int(0), "ctx": {"type": "Del"}}
            ]
        })
    );
}

#[test]
fn test_semicolons_split_statements() {
    let doc = parse_string("a = 1; b = 2;\n").unwrap();
    assert_eq!(doc.root().body.len(), 2);
}

#[test]
fn test_if_elif_else_nests() {
    let stmt = first_stmt("if a:\n    pass\nelif b:\n    pass\nelse:\n    x = 1\n");
    assert_eq!(stmt["orelse"][0]["type"], "If");
    assert_eq!(stmt["orelse"][0]["orelse"][0]["type"], "Assign");
}

#[test]
fn test_loops_with_else() {
    let stmt = first_stmt("for i, j in pairs:\n    break\nelse:\n    continue\n");
    assert_eq!(stmt["target"]["ctx"], json!({"type": "Store"}));
    assert_eq!(stmt["orelse"], json!([{"type": "Continue"}]));
    let stmt = first_stmt("while (n := n - 1):\n    pass\n");
    assert_eq!(stmt["test"]["type"], "NamedExpr");
}

#[test]
fn test_with_items() {
    assert_eq!(
        first_stmt("with open(p) as f, lock:\n    pass\n")["items"][0]["optional_vars"],
        name("f", "Store")
    );
}

#[test]
fn test_relative_imports() {
    assert_eq!(
        first_stmt("from ..pkg.mod import (a, b as c,)"),
        json!({
            "type": "ImportFrom",
            "module": "pkg.mod",
            "names": [
                {"type": "alias", "name": "a"},
                {"type": "alias", "name": "b", "asname": "c"}
            ],
            "level": 2
        })
    );
    assert_eq!(first_stmt("from . import *")["level"], 1);
}

#[test]
fn test_global_nonlocal_and_assert() {
    assert_eq!(first_stmt("global a, b"), json!({"type": "Global", "names": ["a", "b"]}));
    assert_eq!(first_stmt("assert x, 'msg'")["msg"]["value"], "msg");
}

#[test]
fn test_raise_from() {
    let stmt = first_stmt("raise ValueError() from err");
    assert_eq!(stmt["cause"], name("err", "Load"));
}

#[test]
fn test_decorated_class() {
    let stmt = first_stmt("@dataclass(frozen=True)\nclass P(Base, metaclass=M):\n    x: int\n");
    assert_eq!(stmt["decorator_list"][0]["type"], "Call");
    assert_eq!(stmt["keywords"][0]["arg"], "metaclass");
}

// ---
// Syntax errors
// ---

#[test]
fn test_invalid_assignment_targets() {
    assert_eq!(syntax_message("f() = 1"), "cannot assign to function call");
    assert_eq!(syntax_message("1 = x"), "cannot assign to literal");
    assert_eq!(syntax_message("a + 1 += 2"), "illegal expression for augmented assignment");
    assert_eq!(syntax_message("del f()"), "cannot delete function call");
    assert_eq!(syntax_message("a, b: int"), "only single target (not tuple) can be annotated");
}

#[test]
fn test_argument_order_errors() {
    assert_eq!(syntax_message("f(a=1, b)"), "positional argument follows keyword argument");
    assert_eq!(
        syntax_message("f(**a, b)"),
        "positional argument follows keyword argument unpacking"
    );
    assert_eq!(
        syntax_message("f(**a, *b)"),
        "iterable argument unpacking follows keyword argument unpacking"
    );
    assert_eq!(syntax_message("f(x for x in y, 1)"), "Generator expression must be parenthesized");
    assert_eq!(syntax_message("def f(a=1, b): pass"), "non-default argument follows default argument");
    assert_eq!(syntax_message("def f(*): pass"), "named arguments must follow bare *");
}

#[test]
fn test_block_errors() {
    assert_eq!(syntax_message("if x:\npass\n"), "expected an indented block");
    assert_eq!(syntax_message("  x = 1\n"), "unexpected indent");
    assert_eq!(
        syntax_message("try:\n    pass\nexcept:\n    pass\nexcept E:\n    pass\n"),
        "default 'except:' must be last"
    );
}

#[test]
fn test_errors_report_line_and_column() {
    match parse_string("x = 1\ny = )\n") {
        Err(AstError::Syntax { line, column, .. }) => assert_eq!((line, column), (2, 5)),
        other => panic!("expected a syntax error, got {other:?}"),
    }
}

#[test]
fn test_nesting_limit() {
    let options = ParseOptions::with_max_nesting(10);
    let shallow = format!("{}1{}", "(".repeat(5), ")".repeat(5));
    assert!(parse_string_with(&shallow, &options).is_ok());

    let deep = format!("{}1{}", "[".repeat(20), "]".repeat(20));
    match parse_string_with(&deep, &options) {
        Err(AstError::Syntax { message, .. }) => assert_eq!(message, "too many nested parentheses"),
        other => panic!("expected a syntax error, got {other:?}"),
    }

    let unary = format!("{}1", "-".repeat(20));
    match parse_string_with(&unary, &options) {
        Err(AstError::Syntax { message, .. }) => assert_eq!(message, "too many levels of nesting"),
        other => panic!("expected a syntax error, got {other:?}"),
    }
}

#[test]
fn test_default_nesting_limit() {
    let within = format!("{}1{}", "(".repeat(30), ")".repeat(30));
    assert_eq!(expr(&within), int(1));

    let calls = format!("{}{}", "f(".repeat(3000), ")".repeat(3000));
    assert_eq!(syntax_message(&calls), "too many nested parentheses");

    let subscripts = format!("{}0{}", "a[".repeat(3000), "]".repeat(3000));
    assert_eq!(syntax_message(&subscripts), "too many nested parentheses");

    let parens = format!("{}1{}", "(".repeat(60), ")".repeat(60));
    assert_eq!(syntax_message(&parens), "too many nested parentheses");
}

#[test]
fn test_call_and_subscript_nesting_count_with_blocks() {
    let options = ParseOptions::with_max_nesting(10);
    let mut source = String::new();
    for level in 0..5 {
        source.push_str(&format!("{}if x:\n", "    ".repeat(level)));
    }
    let indent = "    ".repeat(5);

    let calls = format!("{indent}{}0{}\n", "f(".repeat(8), ")".repeat(8));
    match parse_string_with(&(source.clone() + &calls), &options) {
        Err(AstError::Syntax { message, .. }) => assert_eq!(message, "too many nested parentheses"),
        other => panic!("expected a syntax error, got {other:?}"),
    }

    let subscripts = format!("{indent}{}0{}\n", "a[".repeat(8), "]".repeat(8));
    match parse_string_with(&(source.clone() + &subscripts), &options) {
        Err(AstError::Syntax { message, .. }) => assert_eq!(message, "too many nested parentheses"),
        other => panic!("expected a syntax error, got {other:?}"),
    }

    let shallow = format!("{indent}f(a[0])\n");
    assert!(parse_string_with(&(source + &shallow), &options).is_ok());
}

#[test]
fn test_lone_surrogate_escapes() {
    let doc = parse_string("x = '\\ud800'\n").unwrap();
    let json = doc.to_json().unwrap();
    assert!(json.contains(r#""value":"\ud800","kind":"str""#), "json was: {json}");
    assert_eq!(doc.to_value()[0]["body"][0]["value"]["value"], "\u{FFFD}");

    // A surrogate pair written as two escapes stays two code points.
    let json = parse_string("'\\ud83d' '\\ude00'").unwrap().to_json().unwrap();
    assert!(json.contains(r#""value":"\ud83d\ude00""#), "json was: {json}");
}

#[test]
fn test_named_unicode_escapes() {
    assert_eq!(expr("'\\N{GREEK SMALL LETTER ALPHA}'")["value"], "α");
    assert_eq!(expr("f'\\N{LEFT CURLY BRACKET}{x}'")["values"][0]["value"], "{");
    assert_eq!(expr("b'\\N{DASH}'")["value"], "\\N{DASH}");
    assert_eq!(
        syntax_message("'\\N{NOT A REAL NAME}'"),
        "(unicode error) unknown Unicode character name"
    );
}

#[test]
fn test_identifiers_are_normalized() {
    assert_eq!(
        first_stmt("\u{ff57}\u{ff49}\u{ff44}\u{ff54}\u{ff48} = 1")["targets"][0],
        name("width", "Store")
    );
    assert_eq!(expr("\u{b5}"), name("\u{3bc}", "Load"));
    assert_eq!(expr("obj.\u{ff41}")["attr"], "a");
    assert_eq!(first_stmt("def \u{ff46}(): pass")["name"], "f");
}

#[test]
fn test_triple_quoted_strings_in_fstring_fields() {
    let value = expr(r#"f"{'''eric's'''}""#);
    assert_eq!(
        value["values"][0]["value"],
        json!({"type": "Constant", "value": "eric's", "kind": "str"})
    );
}
