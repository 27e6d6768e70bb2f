//! Model reply repair.
//!
//! Two stages: [`strip_fences`] removes Markdown code-fence noise, then
//! [`parse_document`] attempts a strict JSON parse. The result is tagged so
//! callers can tell a real answer from the diagnostic fallback; only
//! [`Repaired::Parsed`] is ever eligible for caching.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::document::IdiomDocument;

static LEADING_FENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^```[A-Za-z0-9_+\-]*[ \t]*").unwrap());

static TRAILING_FENCE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"```$").unwrap());

/// Outcome of repairing one model reply.
#[derive(Debug, Clone, PartialEq)]
pub enum Repaired {
    /// The reply parsed to a JSON object; returned untouched.
    Parsed(Value),
    /// The reply was unusable; carries a diagnostic [`IdiomDocument`].
    Fallback(Value),
}

impl Repaired {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Repaired::Fallback(_))
    }

    pub fn document(&self) -> &Value {
        match self {
            Repaired::Parsed(v) | Repaired::Fallback(v) => v,
        }
    }

    pub fn into_document(self) -> Value {
        match self {
            Repaired::Parsed(v) | Repaired::Fallback(v) => v,
        }
    }
}

/// Strip surrounding whitespace and code-fence delimiters (with optional
/// language tag). Repeats until stable, so `strip_fences(strip_fences(x)) ==
/// strip_fences(x)`.
pub fn strip_fences(raw: &str) -> &str {
    let mut current = raw.trim();
    loop {
        let mut next = current;
        if let Some(m) = LEADING_FENCE_RE.find(next) {
            next = &next[m.end()..];
        }
        next = next.trim();
        if let Some(m) = TRAILING_FENCE_RE.find(next) {
            next = &next[..m.start()];
        }
        next = next.trim();
        if next.len() == current.len() {
            return next;
        }
        current = next;
    }
}

/// Parse cleaned text as a JSON object.
pub fn parse_document(cleaned: &str) -> Option<Value> {
    match serde_json::from_str::<Value>(cleaned) {
        Ok(value @ Value::Object(_)) => Some(value),
        _ => None,
    }
}

/// Repair a raw model reply for the user input `original`. Never fails.
pub fn repair(raw: &str, original: &str) -> Repaired {
    let cleaned = strip_fences(raw);
    match parse_document(cleaned) {
        Some(doc) => Repaired::Parsed(doc),
        None => Repaired::Fallback(IdiomDocument::parse_failed(original, cleaned).into_value()),
    }
}
