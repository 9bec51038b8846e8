//! Input validation shared by the services.
//!
//! Request bodies are deserialized into structs of optional fields so that
//! missing input is reported with the same JSON error shape as any other
//! validation failure.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Message used whenever a required field is absent or blank.
pub const ALL_FIELDS_REQUIRED: &str = "All fields are required";

/// Message used when field rules fail; details are in `errors`.
pub const VALIDATION_FAILED: &str = "Validation failed";

/// Rejected client input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    /// Summary shown to the client.
    pub message: String,
    /// Individual rule violations, empty for single-message errors.
    pub errors: Vec<String>,
}

impl ValidationError {
    /// A validation error with only a summary message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            errors: Vec::new(),
        }
    }

    /// A validation error listing every violated rule.
    #[must_use]
    pub fn with_errors(errors: Vec<String>) -> Self {
        Self {
            message: VALIDATION_FAILED.to_owned(),
            errors,
        }
    }

    /// Shorthand for [`ALL_FIELDS_REQUIRED`].
    #[must_use]
    pub fn missing_fields() -> Self {
        Self::new(ALL_FIELDS_REQUIRED)
    }
}

/// Trim a field, treating blank input as absent.
#[must_use]
pub fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Whether `value` has between `min` and `max` characters (inclusive).
#[must_use]
pub fn char_len_between(value: &str, min: usize, max: usize) -> bool {
    (min..=max).contains(&value.chars().count())
}

/// Read an integer from JSON that may be a number or a numeric string.
///
/// HTML form inputs submit numbers as strings, so `"4"` is accepted.
/// Fractions and anything else are rejected.
#[must_use]
pub fn integer_from_json(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Deserialize a present field as `Some`, even when it is `null`.
///
/// Used with `#[serde(default)]` to tell an absent key from an explicit `null`.
///
/// # Errors
///
/// Propagates the inner deserializer error.
pub fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_present() {
        assert_eq!(present(Some("  x ")), Some("x"));
        assert_eq!(present(Some("   ")), None);
        assert_eq!(present(None), None);
    }

    #[test]
    fn test_char_len_counts_characters_not_bytes() {
        assert!(char_len_between("ééééé", 5, 5));
        assert!(!char_len_between("", 1, 60));
        assert!(char_len_between(&"a".repeat(60), 1, 60));
        assert!(!char_len_between(&"a".repeat(61), 1, 60));
    }

    #[test]
    fn test_integer_from_json() {
        assert_eq!(integer_from_json(&json!(4)), Some(4));
        assert_eq!(integer_from_json(&json!("3")), Some(3));
        assert_eq!(integer_from_json(&json!(" 5 ")), Some(5));
        assert_eq!(integer_from_json(&json!(4.5)), None);
        assert_eq!(integer_from_json(&json!("four")), None);
        assert_eq!(integer_from_json(&json!(null)), None);
        assert_eq!(integer_from_json(&json!(true)), None);
    }

    #[test]
    fn test_deserialize_some_distinguishes_null_from_absent() {
        #[derive(Deserialize)]
        struct Patch {
            #[serde(default, deserialize_with = "deserialize_some")]
            owner: Option<Value>,
        }

        let absent: Patch = serde_json::from_str("{}").unwrap();
        assert!(absent.owner.is_none());

        let null: Patch = serde_json::from_str(r#"{"owner":null}"#).unwrap();
        assert_eq!(null.owner, Some(Value::Null));
    }

    #[test]
    fn test_error_constructors() {
        assert_eq!(ValidationError::missing_fields().message, ALL_FIELDS_REQUIRED);
        let err = ValidationError::with_errors(vec!["a".into(), "b".into()]);
        assert_eq!(err.to_string(), VALIDATION_FAILED);
        assert_eq!(err.errors.len(), 2);
    }
}
