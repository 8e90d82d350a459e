//! Lenient serde helpers for columns whose stored shape varies between rows

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Deserialize a list of strings stored in any of these shapes:
///
/// - a JSON array: `["Chairs", "Tables"]`
/// - a JSON-encoded array inside a string: `"[\"Chairs\",\"Tables\"]"`
/// - a comma separated string: `"Chairs, Tables"`
/// - `null` or an empty string (empty list)
pub fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.map(list_from_value).unwrap_or_default())
}

fn list_from_value(value: Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .collect(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.starts_with('[') {
                if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(trimmed) {
                    return list_from_value(Value::Array(items));
                }
            }
            split_comma_list(trimmed)
        }
        _ => Vec::new(),
    }
}

/// Split a comma separated string into trimmed, non-empty entries
pub fn split_comma_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Deserialize an optional string that treats `""` as absent
pub fn non_empty_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|s| !s.trim().is_empty()))
}
