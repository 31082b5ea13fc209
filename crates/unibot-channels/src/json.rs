//! Lenient accessors for platform JSON payloads.
//!
//! Normalizers must never fail on malformed input, so every helper here maps
//! a missing or oddly-typed field to `None`.

use serde_json::Value;

/// Platform ids arrive as numbers (Telegram) or strings (Discord snowflakes).
pub(crate) fn id_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Like [`id_of`] but coerces a missing id to the empty string.
pub(crate) fn id_or_empty(value: &Value) -> String {
    id_of(value).unwrap_or_default()
}

pub(crate) fn string_of(value: &Value) -> Option<String> {
    value.as_str().map(str::to_string)
}

pub(crate) fn is_true(value: &Value) -> bool {
    value.as_bool().unwrap_or(false)
}

/// `value[key]` if it is a JSON object.
pub(crate) fn object<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    value.get(key).filter(|v| v.is_object())
}
