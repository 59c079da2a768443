//! Lenient readers for loosely-typed JSON scalars.
//!
//! Model output and instructor-authored rubrics both carry numbers that
//! sometimes arrive as strings (`"8"`, `"12.5"`) or as empty strings. These
//! helpers treat anything that is not a finite number as absent.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// Reads a finite number from a JSON value, accepting numeric strings.
pub fn number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

/// Reads a finite number stored under `key`.
pub fn number_field(obj: &Map<String, Value>, key: &str) -> Option<f64> {
    obj.get(key).and_then(number)
}

/// Reads a non-blank string stored under `key`.
pub fn text_field<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    obj.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

/// Reads the first non-blank string among `keys`.
pub fn first_text_field<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|key| text_field(obj, key))
}

/// Rounds to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Serde adapter for optional numbers that may be encoded as strings.
pub fn deserialize_optional_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(number))
}

/// Serde adapter mapping an explicit `null` to the type's default.
pub fn deserialize_null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
