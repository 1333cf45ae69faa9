//! Settable object metadata and its validation

use crate::error::StorageError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Keys a caller may set on an object
pub const SETTABLE_FIELDS: [&str; 6] = [
    "cacheControl",
    "contentDisposition",
    "contentEncoding",
    "contentLanguage",
    "contentType",
    "customMetadata",
];

const CUSTOM_METADATA: &str = "customMetadata";

/// Metadata that passed [`validate_metadata`]
///
/// Holds the caller's mapping unchanged; it is forwarded as-is to the
/// native binding.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct SettableMetadata(Map<String, Value>);

impl SettableMetadata {
    /// Empty metadata
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `contentType`
    pub fn content_type(self, value: impl Into<String>) -> Self {
        self.with("contentType", Value::String(value.into()))
    }

    /// Set `cacheControl`
    pub fn cache_control(self, value: impl Into<String>) -> Self {
        self.with("cacheControl", Value::String(value.into()))
    }

    /// Set `contentDisposition`
    pub fn content_disposition(self, value: impl Into<String>) -> Self {
        self.with("contentDisposition", Value::String(value.into()))
    }

    /// Set `contentEncoding`
    pub fn content_encoding(self, value: impl Into<String>) -> Self {
        self.with("contentEncoding", Value::String(value.into()))
    }

    /// Set `contentLanguage`
    pub fn content_language(self, value: impl Into<String>) -> Self {
        self.with("contentLanguage", Value::String(value.into()))
    }

    /// Clear a string field on the object (`null` on the wire)
    ///
    /// Keys outside the settable set are ignored.
    pub fn clear(self, key: &str) -> Self {
        if !SETTABLE_FIELDS.contains(&key) || key == CUSTOM_METADATA {
            return self;
        }
        self.with(key, Value::Null)
    }

    /// Add one custom metadata entry
    pub fn custom(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let entry = self
            .0
            .entry(CUSTOM_METADATA)
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(map) = entry {
            map.insert(key.into(), Value::String(value.into()));
        }
        self
    }

    fn with(mut self, key: &str, value: Value) -> Self {
        self.0.insert(key.to_string(), value);
        self
    }

    /// Value stored for `key`
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// The underlying mapping
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

/// Check `metadata` against the settable field rules
///
/// Every key must be one of [`SETTABLE_FIELDS`]; `customMetadata` must be an
/// object and every other value a string or null. The first violation is
/// reported.
pub fn validate_metadata(metadata: &Value) -> Result<SettableMetadata, StorageError> {
    let Value::Object(entries) = metadata else {
        return Err(StorageError::InvalidArgument(
            "storage.SettableMetadata must be an object value if provided.".to_string(),
        ));
    };

    for (key, value) in entries {
        if !SETTABLE_FIELDS.contains(&key.as_str()) {
            return Err(StorageError::InvalidArgument(format!(
                "storage.SettableMetadata unknown property '{}' provided for metadata.",
                key
            )));
        }

        if key != CUSTOM_METADATA {
            if !(value.is_string() || value.is_null()) {
                return Err(StorageError::InvalidArgument(format!(
                    "storage.SettableMetadata invalid property '{}' should be a string or null value.",
                    key
                )));
            }
        } else if !value.is_object() {
            return Err(StorageError::InvalidArgument(
                "storage.SettableMetadata.customMetadata must be an object of keys and string values."
                    .to_string(),
            ));
        }
    }

    Ok(SettableMetadata(entries.clone()))
}

/// Full object metadata as returned by the native binding
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FullMetadata {
    /// Bucket name
    #[serde(default)]
    pub bucket: Option<String>,
    /// Object name
    #[serde(default)]
    pub name: Option<String>,
    /// Full object path
    #[serde(default)]
    pub full_path: Option<String>,
    /// Object size in bytes
    #[serde(default)]
    pub size: Option<u64>,
    /// Creation time, as reported by the backend
    #[serde(default)]
    pub time_created: Option<String>,
    /// Last update time, as reported by the backend
    #[serde(default)]
    pub updated: Option<String>,
    /// Content type
    #[serde(default)]
    pub content_type: Option<String>,
    /// Cache-Control header
    #[serde(default)]
    pub cache_control: Option<String>,
    /// Content-Disposition header
    #[serde(default)]
    pub content_disposition: Option<String>,
    /// Content-Encoding header
    #[serde(default)]
    pub content_encoding: Option<String>,
    /// Content-Language header
    #[serde(default)]
    pub content_language: Option<String>,
    /// User supplied key/value pairs
    #[serde(default)]
    pub custom_metadata: Option<BTreeMap<String, String>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rejects_unknown_key() {
        let err = validate_metadata(&json!({"foo": "bar"})).unwrap_err();
        assert!(matches!(err, StorageError::InvalidArgument(ref m) if m.contains("'foo'")));
    }

    #[test]
    fn test_rejects_wrong_type() {
        let err = validate_metadata(&json!({"contentType": 42})).unwrap_err();
        assert!(matches!(err, StorageError::InvalidArgument(ref m) if m.contains("'contentType'")));
    }

    #[test]
    fn test_first_violation_in_input_order() {
        let err = validate_metadata(&json!({"zzz": "a", "contentType": 42})).unwrap_err();
        assert_eq!(
            err,
            StorageError::InvalidArgument(
                "storage.SettableMetadata unknown property 'zzz' provided for metadata."
                    .to_string()
            )
        );
    }

    #[test]
    fn test_keeps_caller_key_order() {
        let input = json!({"contentType": "text/plain", "cacheControl": "no-cache"});
        let metadata = validate_metadata(&input).unwrap();
        let keys: Vec<&str> = metadata.as_map().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["contentType", "cacheControl"]);
    }

    #[test]
    fn test_accepts_valid_metadata() {
        let input = json!({"contentType": "text/plain", "customMetadata": {"a": "1"}});
        let metadata = validate_metadata(&input).unwrap();
        assert_eq!(serde_json::to_value(&metadata).unwrap(), input);
    }

    #[test]
    fn test_accepts_null_values() {
        assert!(validate_metadata(&json!({"cacheControl": null})).is_ok());
    }

    #[test]
    fn test_custom_metadata_must_be_object() {
        for bad in [json!({"customMetadata": "x"}), json!({"customMetadata": null})] {
            let err = validate_metadata(&bad).unwrap_err();
            assert!(err.to_string().contains("customMetadata"));
        }
    }

    #[test]
    fn test_rejects_non_object() {
        assert!(validate_metadata(&json!("text/plain")).is_err());
        assert!(validate_metadata(&json!(null)).is_err());
    }

    #[test]
    fn test_builder_output_validates() {
        let built = SettableMetadata::new()
            .content_type("image/png")
            .clear("cacheControl")
            .clear("customMetadata")
            .custom("owner", "alice");
        let json = serde_json::to_value(&built).unwrap();
        assert_eq!(
            json,
            json!({"contentType": "image/png", "cacheControl": null, "customMetadata": {"owner": "alice"}})
        );
        assert_eq!(validate_metadata(&json).unwrap(), built);
    }
}
