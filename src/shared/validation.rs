use serde::{Deserialize, Deserializer};
use validator::ValidationError;

/// Rejects strings that are empty once surrounding whitespace is removed
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("required");
        err.message = Some("is required".into());
        return Err(err);
    }
    Ok(())
}

/// Metadata blobs must be JSON objects, not arrays or scalars
pub fn validate_json_object(value: &serde_json::Value) -> Result<(), ValidationError> {
    if !value.is_object() {
        let mut err = ValidationError::new("object");
        err.message = Some("must be a JSON object".into());
        return Err(err);
    }
    Ok(())
}

/// Deserializer for `Option<Option<T>>` patch fields.
///
/// Paired with `#[serde(default)]` it yields `None` when the key is absent,
/// `Some(None)` for an explicit `null` and `Some(Some(v))` for a value.
pub fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}
