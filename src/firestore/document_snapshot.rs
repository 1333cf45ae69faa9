//! Firestore DocumentSnapshot and SnapshotMetadata types

use super::field_path::FieldPath;
use super::field_value::{lookup, MapValue, Value};
use serde::{Deserialize, Serialize};

/// Firestore document snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSnapshot {
    /// Full document path, e.g. `cities/SF`
    pub path: String,

    /// Document data (None if document doesn't exist)
    pub data: Option<MapValue>,

    /// Document metadata
    pub metadata: SnapshotMetadata,
}

impl DocumentSnapshot {
    /// Snapshot of an existing document
    pub fn new(path: impl Into<String>, data: MapValue) -> Self {
        Self {
            path: path.into(),
            data: Some(data),
            metadata: SnapshotMetadata::default(),
        }
    }

    /// Snapshot of a document that does not exist
    pub fn missing(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            data: None,
            metadata: SnapshotMetadata::default(),
        }
    }

    /// Check if document exists
    pub fn exists(&self) -> bool {
        self.data.is_some()
    }

    /// Get a field value by dotted path
    ///
    /// Returns `None` for invalid paths, missing fields and missing documents.
    pub fn get(&self, field: &str) -> Option<&Value> {
        let path = FieldPath::from_dot_separated(field).ok()?;
        self.get_path(&path)
    }

    /// Get a field value by [`FieldPath`]
    pub fn get_path(&self, path: &FieldPath) -> Option<&Value> {
        lookup(self.data.as_ref()?, path)
    }

    /// Get document ID (last path segment)
    pub fn id(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

/// Metadata about a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotMetadata {
    /// Whether the snapshot contains pending writes
    #[serde(default)]
    pub has_pending_writes: bool,

    /// Whether the data came from cache
    #[serde(default)]
    pub from_cache: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> DocumentSnapshot {
        let mut inner = MapValue::new();
        inner.insert("city".to_string(), "SF".into());
        let mut data = MapValue::new();
        data.insert("name".to_string(), "Alice".into());
        data.insert("address".to_string(), Value::Map(inner));
        DocumentSnapshot::new("users/alice", data)
    }

    #[test]
    fn test_id_is_last_segment() {
        assert_eq!(snapshot().id(), "alice");
        assert_eq!(DocumentSnapshot::missing("solo").id(), "solo");
    }

    #[test]
    fn test_get_fields() {
        let snap = snapshot();
        assert_eq!(snap.get("name"), Some(&Value::from("Alice")));
        assert_eq!(snap.get("address.city"), Some(&Value::from("SF")));
        assert_eq!(snap.get("age"), None);
        assert_eq!(snap.get("a..b"), None);
    }

    #[test]
    fn test_missing_document() {
        let snap = DocumentSnapshot::missing("users/bob");
        assert!(!snap.exists());
        assert_eq!(snap.get("name"), None);
    }

    #[test]
    fn test_document_snapshot_metadata_default() {
        let metadata = SnapshotMetadata::default();
        assert!(!metadata.has_pending_writes);
        assert!(!metadata.from_cache);
    }
}
