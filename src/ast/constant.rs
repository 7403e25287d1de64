//! Literal values carried by `Constant` nodes.

use std::cell::Cell;

use serde::ser::{Error as _, SerializeStruct};
use serde::{Serialize, Serializer};
use serde_json::value::RawValue;

/// The decoded value of a literal.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstantValue {
    None,
    Bool(bool),
    Int(u64),
    /// Integer literal too large for 64 bits, kept as its normalized text.
    BigInt(String),
    Float(f64),
    /// Imaginary literal; holds the imaginary part.
    Complex(f64),
    Str(PyString),
    /// Byte string; each byte is stored as the code point of the same value.
    Bytes(String),
    Ellipsis,
}

impl ConstantValue {
    /// The `kind` tag written next to the value.
    pub fn kind(&self) -> &'static str {
        match self {
            ConstantValue::None => "None",
            ConstantValue::Bool(_) => "bool",
            ConstantValue::Int(_) | ConstantValue::BigInt(_) => "int",
            ConstantValue::Float(_) => "float",
            ConstantValue::Complex(_) => "complex",
            ConstantValue::Str(_) => "str",
            ConstantValue::Bytes(_) => "bytes",
            ConstantValue::Ellipsis => "Ellipsis",
        }
    }
}

impl Serialize for ConstantValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ConstantValue::None | ConstantValue::Ellipsis => serializer.serialize_none(),
            ConstantValue::Bool(b) => serializer.serialize_bool(*b),
            ConstantValue::Int(n) => serializer.serialize_u64(*n),
            ConstantValue::BigInt(text) => serializer.serialize_str(text),
            ConstantValue::Float(f) | ConstantValue::Complex(f) => serialize_float(*f, serializer),
            ConstantValue::Str(s) => s.serialize(serializer),
            ConstantValue::Bytes(s) => serializer.serialize_str(s),
        }
    }
}

fn serialize_float<S: Serializer>(value: f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.is_nan() {
        serializer.serialize_str("nan")
    } else if value.is_infinite() {
        serializer.serialize_str(if value > 0.0 { "inf" } else { "-inf" })
    } else {
        serializer.serialize_f64(value)
    }
}

// ============================================================================
// STR VALUES
// ============================================================================

/// The text of a `str` literal.
///
/// Python strings are sequences of code points and may hold lone surrogates
/// (`'\ud800'`), which `String` cannot. Those are kept beside the text as
/// (byte offset, code unit) pairs, in order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PyString {
    text: String,
    surrogates: Vec<(usize, u16)>,
}

impl PyString {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, c: char) {
        self.text.push(c);
    }

    pub fn push_str(&mut self, text: &str) {
        self.text.push_str(text);
    }

    /// Appends a code point in `0xD800..=0xDFFF`.
    pub fn push_surrogate(&mut self, unit: u16) {
        self.surrogates.push((self.text.len(), unit));
    }

    pub fn append(&mut self, other: &PyString) {
        let offset = self.text.len();
        self.text.push_str(&other.text);
        self.surrogates
            .extend(other.surrogates.iter().map(|&(at, unit)| (offset + at, unit)));
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.surrogates.is_empty()
    }

    pub fn has_surrogates(&self) -> bool {
        !self.surrogates.is_empty()
    }

    /// The text, when it holds no lone surrogates.
    pub fn as_str(&self) -> Option<&str> {
        self.surrogates.is_empty().then_some(self.text.as_str())
    }

    /// The text with every lone surrogate replaced by U+FFFD.
    pub fn to_string_lossy(&self) -> String {
        let mut out = String::with_capacity(self.text.len());
        self.for_each_piece(|piece| match piece {
            Piece::Text(text) => out.push_str(text),
            Piece::Surrogate(_) => out.push(char::REPLACEMENT_CHARACTER),
        });
        out
    }

    /// The value as a quoted JSON string; lone surrogates become `\udXXX`
    /// escapes.
    fn to_json_literal(&self) -> serde_json::Result<String> {
        let mut out = String::with_capacity(self.text.len() + 2);
        out.push('"');
        let mut result = Ok(());
        self.for_each_piece(|piece| match piece {
            Piece::Text(text) if result.is_ok() => match serde_json::to_string(text) {
                Ok(quoted) => out.push_str(&quoted[1..quoted.len() - 1]),
                Err(e) => result = Err(e),
            },
            Piece::Text(_) => {}
            Piece::Surrogate(unit) => out.push_str(&format!("\\u{unit:04x}")),
        });
        out.push('"');
        result.map(|()| out)
    }

    fn for_each_piece<'a>(&'a self, mut visit: impl FnMut(Piece<'a>)) {
        let mut at = 0;
        for &(offset, unit) in &self.surrogates {
            if offset > at {
                visit(Piece::Text(&self.text[at..offset]));
            }
            visit(Piece::Surrogate(unit));
            at = offset;
        }
        if at < self.text.len() {
            visit(Piece::Text(&self.text[at..]));
        }
    }
}

enum Piece<'a> {
    Text(&'a str),
    Surrogate(u16),
}

impl From<&str> for PyString {
    fn from(text: &str) -> Self {
        Self {
            text: text.to_string(),
            surrogates: Vec::new(),
        }
    }
}

impl From<String> for PyString {
    fn from(text: String) -> Self {
        Self {
            text,
            surrogates: Vec::new(),
        }
    }
}

thread_local! {
    static REPLACE_SURROGATES: Cell<bool> = const { Cell::new(false) };
}

/// Runs `f` with lone surrogates serialized as U+FFFD, for targets such as
/// `serde_json::Value` that only hold valid Unicode.
pub(crate) fn with_replaced_surrogates<T>(f: impl FnOnce() -> T) -> T {
    let previous = REPLACE_SURROGATES.with(|flag| flag.replace(true));
    let result = f();
    REPLACE_SURROGATES.with(|flag| flag.set(previous));
    result
}

impl Serialize for PyString {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if let Some(text) = self.as_str() {
            return serializer.serialize_str(text);
        }
        if REPLACE_SURROGATES.with(Cell::get) {
            return serializer.serialize_str(&self.to_string_lossy());
        }
        let literal = self.to_json_literal().map_err(S::Error::custom)?;
        let raw = RawValue::from_string(literal).map_err(S::Error::custom)?;
        raw.serialize(serializer)
    }
}

/// Payload of `Expr::Constant`.
#[derive(Debug, Clone, PartialEq)]
pub struct Constant {
    pub value: ConstantValue,
}

impl Constant {
    pub fn new(value: ConstantValue) -> Self {
        Self { value }
    }

    pub fn str(text: impl Into<PyString>) -> Self {
        Self::new(ConstantValue::Str(text.into()))
    }
}

impl Serialize for Constant {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Constant", 2)?;
        state.serialize_field("value", &self.value)?;
        state.serialize_field("kind", self.value.kind())?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn constants_carry_their_kind() {
        let value = serde_json::to_value(Constant::new(ConstantValue::Int(7))).unwrap();
        assert_eq!(value, json!({"value": 7, "kind": "int"}));

        let value = serde_json::to_value(Constant::new(ConstantValue::Ellipsis)).unwrap();
        assert_eq!(value, json!({"value": null, "kind": "Ellipsis"}));
    }

    #[test]
    fn lone_surrogates_are_written_as_json_escapes() {
        let mut text = PyString::from("a");
        text.push_surrogate(0xD800);
        text.push_str("b");
        text.push_surrogate(0xDC01);
        let json = serde_json::to_string(&ConstantValue::Str(text.clone())).unwrap();
        assert_eq!(json, r#""a\ud800b\udc01""#);
        assert_eq!(text.to_string_lossy(), "a\u{FFFD}b\u{FFFD}");
        assert_eq!(text.as_str(), None);
    }

    #[test]
    fn appended_strings_keep_surrogate_positions() {
        let mut head = PyString::from("xy");
        let mut tail = PyString::from("z");
        tail.push_surrogate(0xDFFF);
        head.append(&tail);
        assert_eq!(head.to_json_literal().unwrap(), r#""xyz\udfff""#);
    }

    #[test]
    fn non_finite_floats_become_strings() {
        let value = serde_json::to_value(ConstantValue::Float(f64::INFINITY)).unwrap();
        assert_eq!(value, json!("inf"));
    }
}
