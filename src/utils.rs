use crate::config::SEARCH_FAILED_MESSAGE;
use serde_json::Value;

/// Wall-clock time in milliseconds since the Unix epoch.
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

/// Wall-clock time in milliseconds since the Unix epoch.
#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

/// A filter value that carries no constraint: `null`, `""` or `[]`.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Message to surface for a failed search, never empty.
pub fn error_message(raw: String) -> String {
    if raw.trim().is_empty() {
        SEARCH_FAILED_MESSAGE.to_string()
    } else {
        raw
    }
}
