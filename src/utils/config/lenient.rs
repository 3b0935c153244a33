//! Field readers that fall back to the field's default when the stored value has the wrong
//! type, so one bad entry does not discard the rest of the file.

use serde::{de::DeserializeOwned, Deserialize, Deserializer};
use serde_json::Value;

fn read_or<T: DeserializeOwned>(value: Value, fallback: impl FnOnce() -> T) -> T {
    T::deserialize(value).unwrap_or_else(|_| fallback())
}

pub fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(read_or(value, T::default))
}

pub fn or_true<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(read_or(value, || true))
}

/// A list where a non-array becomes empty and each malformed element becomes `T::default()`.
pub fn list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let items = match Value::deserialize(deserializer)? {
        Value::Array(items) => items,
        _ => return Ok(Vec::new()),
    };
    Ok(items
        .into_iter()
        .map(|item| read_or(item, T::default))
        .collect())
}
