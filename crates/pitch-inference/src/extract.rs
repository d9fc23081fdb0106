//! Structured response extraction.
//!
//! Model replies are supposed to be a single JSON object, but in practice
//! arrive wrapped in prose, markdown fences or both. Extraction is an ordered
//! cascade of strategies, each independently testable; the first one that
//! yields a well-formed object wins. Nothing is synthesized here — if every
//! strategy fails, the caller gets the original text back for diagnostics.

use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::error::{InferenceError, InferenceResult};

/// One extraction strategy: returns a parsed object, or None to fall through.
pub type Strategy = fn(&str) -> Option<Value>;

/// Strategies in priority order.
pub const STRATEGIES: &[(&str, Strategy)] = &[
    ("outer-braces", outer_braces),
    ("fenced-block", fenced_block),
    ("balanced-scan", balanced_scan),
    ("strip-noise", strip_noise),
];

/// Recover a single JSON object from free-form model text.
pub fn extract_json(text: &str) -> InferenceResult<Value> {
    for (name, strategy) in STRATEGIES {
        if let Some(value) = strategy(text) {
            debug!("Extracted JSON via {} strategy", name);
            return Ok(value);
        }
    }
    Err(InferenceError::Extraction {
        text: text.to_string(),
    })
}

fn parse_object(candidate: &str) -> Option<Value> {
    let value: Value = serde_json::from_str(candidate.trim()).ok()?;
    value.is_object().then_some(value)
}

/// Substring from the first `{` to the last `}`.
fn outer_braces(text: &str) -> Option<Value> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    parse_object(&text[start..=end])
}

/// Interior of a fenced code block, optionally tagged `json`.
fn fenced_block(text: &str) -> Option<Value> {
    let re = Regex::new(r"(?s)```(?:json)?\s*(.*?)```").ok()?;
    let captures = re.captures(text)?;
    parse_object(captures.get(1)?.as_str())
}

/// First brace-balanced object found by a string-aware scan.
fn balanced_scan(text: &str) -> Option<Value> {
    let start = text.find('{')?;
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return parse_object(&text[start..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Strip fence markers and surrounding prose, then parse what remains.
fn strip_noise(text: &str) -> Option<Value> {
    let stripped = text.replace("```json", "").replace("```", "");
    let start = stripped.find('{')?;
    let end = stripped.rfind('}')?;
    if end < start {
        return None;
    }
    parse_object(&stripped[start..=end])
}
