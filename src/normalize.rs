//! Field-level cleaning for raw standings rows.
//!
//! Every function here returns a usable value. Coercions go through
//! [`Coerced`] so callers can tell a parsed value from a fallback without
//! any error escaping.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Outcome of a typed field parse
#[derive(Debug, Clone, PartialEq)]
pub enum Coerced<T> {
    Parsed(T),
    Fallback { raw: String },
}

impl<T> Coerced<T> {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Coerced::Fallback { .. })
    }

    pub fn or_default_value(self, default: T) -> T {
        match self {
            Coerced::Parsed(v) => v,
            Coerced::Fallback { .. } => default,
        }
    }
}

/// Collapse runs of whitespace (including newlines) to one space and trim.
pub fn normalize_text(text: &str) -> String {
    WHITESPACE_RUN.replace_all(text, " ").trim().to_string()
}

/// Render a raw field as text: strings verbatim, numbers and booleans via
/// their JSON form, null/absent as empty.
pub fn value_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Normalized text for an optional field, substituting `default` when the
/// field is absent or null.
pub fn normalize_field(value: Option<&Value>, default: &str) -> String {
    match value {
        None | Some(Value::Null) => normalize_text(default),
        Some(v) => normalize_text(&value_text(Some(v))),
    }
}

pub fn parse_year(value: Option<&Value>) -> Coerced<i32> {
    let parsed = match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
            .and_then(|i| i32::try_from(i).ok()),
        Some(Value::String(s)) => s.trim().parse::<i32>().ok(),
        _ => None,
    };
    match parsed {
        Some(year) => Coerced::Parsed(year),
        None => Coerced::Fallback { raw: value_text(value) },
    }
}

pub fn parse_points(value: Option<&Value>) -> Coerced<f64> {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed.filter(|p| p.is_finite()) {
        Some(points) => Coerced::Parsed(points),
        None => Coerced::Fallback { raw: value_text(value) },
    }
}

/// Year as an integer, or 0 when the field cannot be read as one
pub fn coerce_year(value: Option<&Value>) -> i32 {
    parse_year(value).or_default_value(0)
}

/// Points as a float, or 0.0 when the field cannot be read as one
pub fn coerce_points(value: Option<&Value>) -> f64 {
    parse_points(value).or_default_value(0.0)
}
