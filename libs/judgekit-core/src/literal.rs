//! Encoders that turn the serialized test-case payload into source text.
//!
//! Scripting templates take a native data literal. Compiled templates take a
//! string literal which the program parses at runtime with its JSON library.

use serde_json::Value;
use std::fmt::Write;

use crate::types::Language;

/// Java string constants are capped at 65535 bytes of modified UTF-8 in the class file.
const JAVA_CHUNK_BYTES: usize = 8 * 1024;

/// How a template expects the test-case payload to be embedded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadEncoding {
    NativeLiteral,
    StringLiteral,
}

/// Encode `payload` for `language` using the given embedding strategy
pub fn encode_payload(payload: &Value, language: Language, encoding: PayloadEncoding) -> String {
    match (encoding, language) {
        (PayloadEncoding::NativeLiteral, Language::Python) => python_literal(payload),
        (PayloadEncoding::NativeLiteral, _) => javascript_literal(payload),
        (PayloadEncoding::StringLiteral, Language::Java) => java_string_chunks(&payload.to_string()),
        (PayloadEncoding::StringLiteral, _) => cpp_string_literal(&payload.to_string()),
    }
}

/// JavaScript literal for a JSON value.
///
/// JSON is nearly valid JavaScript: the two line-terminator code points need
/// escaping, and a literal `"__proto__"` key sets the prototype instead of
/// creating a property, so it is emitted as a computed key.
pub fn javascript_literal(value: &Value) -> String {
    let mut out = String::new();
    write_javascript(value, &mut out);
    out
}

fn write_javascript(value: &Value, out: &mut String) {
    match value {
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_javascript(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            out.push('{');
            for (i, (key, item)) in map.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                if key == "__proto__" {
                    out.push_str("[\"__proto__\"]");
                } else {
                    out.push_str(&javascript_string(key));
                }
                out.push(':');
                write_javascript(item, out);
            }
            out.push('}');
        }
        Value::String(s) => out.push_str(&javascript_string(s)),
        scalar => out.push_str(&scalar.to_string()),
    }
}

fn javascript_string(text: &str) -> String {
    Value::String(text.to_string())
        .to_string()
        .replace('\u{2028}', "\\u2028")
        .replace('\u{2029}', "\\u2029")
}

/// Python literal for a JSON value (`None`/`True`/`False`, dicts, lists)
pub fn python_literal(value: &Value) -> String {
    let mut out = String::new();
    write_python(value, &mut out);
    out
}

fn write_python(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("None"),
        Value::Bool(true) => out.push_str("True"),
        Value::Bool(false) => out.push_str("False"),
        Value::Number(n) => {
            let _ = write!(out, "{}", n);
        }
        // JSON string escapes are a subset of Python's
        Value::String(s) => out.push_str(&Value::String(s.clone()).to_string()),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_python(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            out.push('{');
            for (i, (key, item)) in map.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push_str(": ");
                write_python(item, out);
            }
            out.push('}');
        }
    }
}

/// Comma-separated Java string literals, each small enough for the constant pool.
///
/// The Java template joins them at runtime with `String.join`.
pub fn java_string_chunks(text: &str) -> String {
    let mut chunks = Vec::new();
    let mut current = String::new();
    for c in text.chars() {
        push_java_char(c, &mut current);
        if current.len() >= JAVA_CHUNK_BYTES {
            chunks.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() || chunks.is_empty() {
        chunks.push(current);
    }

    chunks
        .iter()
        .map(|chunk| format!("\"{}\"", chunk))
        .collect::<Vec<_>>()
        .join(",\n            ")
}

fn push_java_char(c: char, out: &mut String) {
    match c {
        '\\' => out.push_str("\\\\"),
        '"' => out.push_str("\\\""),
        '\n' => out.push_str("\\n"),
        '\r' => out.push_str("\\r"),
        '\t' => out.push_str("\\t"),
        ' '..='~' => out.push(c),
        // Everything else goes through UTF-16 escapes; surrogate pairs for astral chars
        _ => {
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units) {
                let _ = write!(out, "\\u{:04x}", unit);
            }
        }
    }
}

/// C++ narrow string literal; the source is compiled as UTF-8 so non-ASCII passes through
pub fn cpp_string_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '?' => out.push_str("\\?"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 || c == '\u{7f}' => {
                // Octal escapes stop after three digits, hex escapes do not
                let _ = write!(out, "\\{:03o}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
