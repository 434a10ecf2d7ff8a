//! Tolerant readers for hand-edited spawn records.
//!
//! Authoring JSON is typed by people and by several generations of editor,
//! so numbers show up as floats or strings and booleans as `1`, `"yes"` or
//! `"TRUE"`. These helpers accept the shapes the engine has historically
//! written and fall back otherwise.

use serde_json::Value;

/// Borrow a string field
pub fn read_str<'a>(obj: &'a Value, key: &str) -> Option<&'a str> {
    obj.get(key).and_then(Value::as_str)
}

/// Owned string field, empty when absent or not a string
pub fn read_string(obj: &Value, key: &str) -> String {
    read_str(obj, key).unwrap_or_default().to_string()
}

/// Integer field that must be a JSON integer
pub fn read_strict_int(obj: &Value, key: &str) -> Option<i32> {
    obj.get(key).and_then(Value::as_i64).map(saturate_i32)
}

/// Integer field accepting integers, floats (truncated) and numeric strings
pub fn read_int(obj: &Value, key: &str, fallback: i32) -> i32 {
    obj.get(key).and_then(int_value).unwrap_or(fallback)
}

fn int_value(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .map(saturate_i32)
            .or_else(|| n.as_f64().map(|f| f as i32)),
        Value::String(text) => text.trim().parse::<i32>().ok(),
        _ => None,
    }
}

/// Numeric value from a number or a fully numeric string
pub fn read_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Interpret a value as a boolean: bools, integers, and
/// case-insensitive `true/false/yes/no/1/0` strings
pub fn bool_value(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_i64().map(|i| i != 0),
        Value::String(text) => match text.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Some(true),
            "false" | "0" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Tolerant boolean field with fallback
pub fn read_bool(obj: &Value, key: &str, fallback: bool) -> bool {
    obj.get(key).and_then(bool_value).unwrap_or(fallback)
}

fn saturate_i32(v: i64) -> i32 {
    v.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}
