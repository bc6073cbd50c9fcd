//! Best-effort entry-point detection from raw user source.
//!
//! This is a heuristic over text, not a parser. Callers that know the entry point
//! should pass it explicitly.

use lazy_static::lazy_static;
use regex::Regex;

use crate::types::Language;

pub const FALLBACK_FUNCTION_NAME: &str = "solution";

const SKIPPED_NAMES: &[&str] = &[
    "main", "if", "for", "while", "switch", "return", "sizeof", "catch", "new", "delete", "else",
];

lazy_static! {
    static ref JAVASCRIPT_PATTERN: Regex = Regex::new(
        r"(?:function\s+(\w+)|(?:const|let|var)\s+(\w+)\s*=\s*(?:async\s+)?(?:function\b|\([^)]*\)\s*=>|\w+\s*=>))"
    )
    .expect("valid javascript entry-point regex");
    static ref PYTHON_PATTERN: Regex =
        Regex::new(r"(?m)^\s*(?:async\s+)?def\s+(\w+)\s*\(").expect("valid python entry-point regex");
    static ref JAVA_PATTERN: Regex = Regex::new(
        r"(?m)^\s*(?:public|private|protected)?\s*(?:static\s+)?(?:final\s+)?[\w<>\[\], ?]+\s+(\w+)\s*\("
    )
    .expect("valid java entry-point regex");
    static ref CPP_PATTERN: Regex = Regex::new(
        r"(?m)^\s*(?:static\s+|inline\s+)*(?:const\s+)?(?:unsigned\s+)?[\w:]+(?:<[^;{}()]*>)?[\s*&]+(\w+)\s*\("
    )
    .expect("valid c++ entry-point regex");
}

fn is_candidate(name: &str, language: Language) -> bool {
    if SKIPPED_NAMES.contains(&name) {
        return false;
    }
    match language {
        Language::Python => !(name.starts_with("__") && name.ends_with("__")),
        // Constructors share the class name
        Language::Java => !name.starts_with(|c: char| c.is_ascii_uppercase()),
        _ => true,
    }
}

/// First plausible function name declared in `source`, if any
pub fn infer_function_name(source: &str, language: Language) -> Option<String> {
    let pattern: &Regex = match language {
        Language::JavaScript => &JAVASCRIPT_PATTERN,
        Language::Python => &PYTHON_PATTERN,
        Language::Java => &JAVA_PATTERN,
        Language::Cpp => &CPP_PATTERN,
    };

    pattern
        .captures_iter(source)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| m.as_str())
        .find(|name| is_candidate(name, language))
        .map(str::to_string)
}

/// Entry-point name for `source`, or `"solution"` when nothing is recognised
/// (including unsupported languages)
pub fn extract_function_name(source: &str, language: &str) -> String {
    language
        .parse::<Language>()
        .ok()
        .and_then(|language| infer_function_name(source, language))
        .unwrap_or_else(|| FALLBACK_FUNCTION_NAME.to_string())
}
