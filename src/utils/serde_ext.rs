//! Lenient deserializers for the loosely typed JSON the SPA sends.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Distinguishes a missing field (`None`) from an explicit `null` (`Some(None)`).
/// Pair with `#[serde(default)]`.
pub fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Any scalar as trimmed text; `null`, arrays and objects become `""`.
pub fn lax_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(text_of(&Value::deserialize(deserializer)?))
}

/// Like [`lax_text`] but strings are kept as sent. For free text such as notes.
pub fn lax_raw_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(raw_text_of(&Value::deserialize(deserializer)?))
}

/// Like [`lax_text`] but keeps "unset" distinguishable: blank input becomes `None`.
pub fn lax_opt_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let text = text_of(&Value::deserialize(deserializer)?);
    Ok((!text.is_empty()).then_some(text))
}

pub(crate) fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        other => raw_text_of(other),
    }
}

pub(crate) fn raw_text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    }
}

/// Array of strings from anything: non-arrays become empty, non-string items are
/// rendered as text.
pub(crate) fn string_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().map(text_of).collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "double_option")]
        value: Option<Option<String>>,
        #[serde(default, deserialize_with = "lax_text")]
        name: String,
        #[serde(default, deserialize_with = "lax_raw_text")]
        notes: String,
    }

    #[test]
    fn double_option_separates_missing_from_null() {
        let missing: Probe = serde_json::from_value(json!({})).unwrap();
        assert_eq!(missing.value, None);

        let null: Probe = serde_json::from_value(json!({ "value": null })).unwrap();
        assert_eq!(null.value, Some(None));

        let set: Probe = serde_json::from_value(json!({ "value": "abc" })).unwrap();
        assert_eq!(set.value, Some(Some("abc".to_string())));
    }

    #[test]
    fn lax_text_accepts_scalars() {
        let probe: Probe = serde_json::from_value(json!({ "name": 42 })).unwrap();
        assert_eq!(probe.name, "42");

        let probe: Probe = serde_json::from_value(json!({ "name": "  VS Code " })).unwrap();
        assert_eq!(probe.name, "VS Code");

        let probe: Probe = serde_json::from_value(json!({ "name": null })).unwrap();
        assert_eq!(probe.name, "");
    }

    #[test]
    fn lax_raw_text_keeps_surrounding_whitespace() {
        let probe: Probe =
            serde_json::from_value(json!({ "notes": "  indented\n", "name": " a " })).unwrap();
        assert_eq!(probe.notes, "  indented\n");
        assert_eq!(probe.name, "a");

        let probe: Probe = serde_json::from_value(json!({ "notes": 7 })).unwrap();
        assert_eq!(probe.notes, "7");
    }

    #[test]
    fn string_list_coerces_non_arrays() {
        assert!(string_list(&json!("Windows")).is_empty());
        assert_eq!(
            string_list(&json!(["Windows", " macOS ", 3])),
            vec!["Windows".to_string(), "macOS".to_string(), "3".to_string()]
        );
    }
}
