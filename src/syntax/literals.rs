//! Numeric and string literal decoding.

use std::iter::Peekable;
use std::str::Chars;

use crate::ast::{ConstantValue, PyString};

// ============================================================================
// NUMBERS
// ============================================================================

/// Decodes the text of a NUMBER token.
pub fn parse_number(text: &str) -> Result<ConstantValue, String> {
    let clean: String = text.chars().filter(|&c| c != '_').collect();
    let lower = clean.to_ascii_lowercase();

    if let Some(imag) = lower.strip_suffix('j') {
        return parse_float(imag).map(ConstantValue::Complex);
    }
    for (prefix, radix) in [("0x", 16), ("0o", 8), ("0b", 2)] {
        if let Some(digits) = lower.strip_prefix(prefix) {
            return Ok(match u64::from_str_radix(digits, radix) {
                Ok(n) => ConstantValue::Int(n),
                Err(_) => ConstantValue::BigInt(clean),
            });
        }
    }
    if lower.contains(['.', 'e']) {
        return parse_float(&lower).map(ConstantValue::Float);
    }
    if lower.len() > 1 && lower.starts_with('0') && lower.bytes().any(|b| b != b'0') {
        return Err("leading zeros in decimal integer literals are not permitted; \
                    use an 0o prefix for octal integers"
            .to_string());
    }
    Ok(match lower.parse::<u64>() {
        Ok(n) => ConstantValue::Int(n),
        Err(_) => ConstantValue::BigInt(clean),
    })
}

fn parse_float(text: &str) -> Result<f64, String> {
    text.parse::<f64>()
        .map_err(|_| format!("invalid numeric literal '{text}'"))
}

// ============================================================================
// STRINGS
// ============================================================================

/// A STRING token split into its prefix flags and body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StringToken<'src> {
    pub raw: bool,
    pub bytes: bool,
    pub formatted: bool,
    /// Text between the quotes.
    pub body: &'src str,
    /// Byte offset of `body` within the token text.
    pub body_offset: usize,
}

impl<'src> StringToken<'src> {
    pub fn split(text: &'src str) -> Self {
        let prefix_len = text.find(|c: char| c == '\'' || c == '"').unwrap_or(0);
        let prefix = text[..prefix_len].to_ascii_lowercase();
        let rest = &text[prefix_len..];
        let quote_len = if rest.starts_with("\"\"\"") || rest.starts_with("'''") {
            3
        } else {
            1
        };
        let body_end = rest.len().saturating_sub(quote_len).max(quote_len);
        Self {
            raw: prefix.contains('r'),
            bytes: prefix.contains('b'),
            formatted: prefix.contains('f'),
            body: &rest[quote_len..body_end],
            body_offset: prefix_len + quote_len,
        }
    }

    /// The literal's value, for non-f-strings.
    pub fn decode(&self) -> Result<PyString, String> {
        if self.raw {
            decode_raw(self.body, self.bytes).map(PyString::from)
        } else {
            decode_escapes(self.body, self.bytes)
        }
    }
}

/// Raw literal bodies are taken as written, with line endings normalized.
pub fn decode_raw(body: &str, bytes: bool) -> Result<String, String> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if bytes && !c.is_ascii() {
            return Err(NON_ASCII_BYTES.to_string());
        }
        if c == '\r' {
            chars.next_if_eq(&'\n');
            out.push('\n');
        } else {
            out.push(c);
        }
    }
    Ok(out)
}

const NON_ASCII_BYTES: &str = "bytes can only contain ASCII literal characters.";

/// Processes backslash escapes. Unknown escapes are kept verbatim;
/// `\u`, `\U` and `\N{...}` are only escapes in str literals.
pub fn decode_escapes(body: &str, bytes: bool) -> Result<PyString, String> {
    let mut out = PyString::new();
    let mut chars = body.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            if bytes && !c.is_ascii() {
                return Err(NON_ASCII_BYTES.to_string());
            }
            if c == '\r' {
                chars.next_if_eq(&'\n');
                out.push('\n');
            } else {
                out.push(c);
            }
            continue;
        }

        let Some(escape) = chars.next() else {
            out.push('\\');
            break;
        };
        match escape {
            '\n' => {}
            '\r' => {
                chars.next_if_eq(&'\n');
            }
            '\\' => out.push('\\'),
            '\'' => out.push('\''),
            '"' => out.push('"'),
            'a' => out.push('\x07'),
            'b' => out.push('\x08'),
            'f' => out.push('\x0C'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'v' => out.push('\x0B'),
            '0'..='7' => {
                let mut value = escape.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match chars.peek().and_then(|d| d.to_digit(8)) {
                        Some(digit) => {
                            value = value * 8 + digit;
                            chars.next();
                        }
                        None => break,
                    }
                }
                if bytes {
                    value &= 0xFF;
                }
                push_code_point(&mut out, value)?;
            }
            'x' => push_code_point(&mut out, hex_escape(&mut chars, 2, "truncated \\xXX escape")?)?,
            'u' if !bytes => {
                push_code_point(&mut out, hex_escape(&mut chars, 4, "truncated \\uXXXX escape")?)?
            }
            'U' if !bytes => push_code_point(
                &mut out,
                hex_escape(&mut chars, 8, "truncated \\UXXXXXXXX escape")?,
            )?,
            'N' if !bytes => out.push(named_escape(&mut chars)?),
            other => {
                if bytes && !other.is_ascii() {
                    return Err(NON_ASCII_BYTES.to_string());
                }
                out.push('\\');
                out.push(other);
            }
        }
    }
    Ok(out)
}

fn hex_escape(chars: &mut Peekable<Chars<'_>>, digits: usize, truncated: &str) -> Result<u32, String> {
    let mut value = 0u32;
    for _ in 0..digits {
        let digit = chars
            .next_if(|c| c.is_ascii_hexdigit())
            .and_then(|c| c.to_digit(16))
            .ok_or_else(|| format!("(unicode error) {truncated}"))?;
        value = value * 16 + digit;
    }
    Ok(value)
}

/// Appends a decoded code point. Lone surrogates are valid in str literals.
fn push_code_point(out: &mut PyString, value: u32) -> Result<(), String> {
    match (char::from_u32(value), u16::try_from(value)) {
        (Some(c), _) => out.push(c),
        (None, Ok(unit)) => out.push_surrogate(unit),
        (None, Err(_)) => return Err("(unicode error) illegal Unicode character".to_string()),
    }
    Ok(())
}

/// `\N{NAME}`, looked up in the Unicode character name table.
fn named_escape(chars: &mut Peekable<Chars<'_>>) -> Result<char, String> {
    const MALFORMED: &str = "(unicode error) malformed \\N character escape";
    if chars.next_if_eq(&'{').is_none() {
        return Err(MALFORMED.to_string());
    }
    let mut name = String::new();
    loop {
        match chars.next() {
            Some('}') => break,
            Some(c) => name.push(c),
            None => return Err(MALFORMED.to_string()),
        }
    }
    if name.is_empty() {
        return Err(MALFORMED.to_string());
    }
    unicode_names2::character(&name.to_ascii_uppercase())
        .ok_or_else(|| "(unicode error) unknown Unicode character name".to_string())
}
