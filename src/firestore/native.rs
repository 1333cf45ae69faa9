//! Boundary to the native Firestore binding
//!
//! Query execution, listening, caching and networking all happen behind
//! [`FirestoreNative`]. The bridge only builds [`NativeQuery`] values,
//! forwards them, and turns what comes back into snapshots.

use super::document_snapshot::SnapshotMetadata;
use super::field_value::MapValue;
use super::metadata_changes::SnapshotListenOptions;
use super::modifiers::{Filter, Order, QueryOptions, QueryType};
use super::settings::{GetOptions, Settings};
use crate::error::NativeErrorPayload;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Event name prefix for collection listeners; the listener id is appended
pub const COLLECTION_SYNC_EVENT: &str = "firestore_collection_sync_event";

/// Query parameters forwarded to the native binding
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeQuery {
    /// Collection path relative to the database root
    pub path: String,
    /// Collection or collection group
    #[serde(rename = "type")]
    pub query_type: QueryType,
    /// `where` clauses
    pub filters: Vec<Filter>,
    /// `orderBy` clauses
    pub orders: Vec<Order>,
    /// Limit and cursors
    pub options: QueryOptions,
}

/// One document as delivered by the native binding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeDocument {
    /// Full document path
    pub path: String,
    /// Whether the document exists
    #[serde(default = "default_exists")]
    pub exists: bool,
    /// Field data
    #[serde(default)]
    pub data: MapValue,
    /// Per-document metadata
    #[serde(default)]
    pub metadata: SnapshotMetadata,
}

fn default_exists() -> bool {
    true
}

/// Change type as named by the native binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NativeChangeType {
    /// Document entered the result set
    Added,
    /// Document changed in place
    Modified,
    /// Document left the result set
    Removed,
}

/// One change between two query snapshots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeDocumentChange {
    /// Kind of change
    #[serde(rename = "type")]
    pub change_type: NativeChangeType,
    /// Changed document
    pub doc: NativeDocument,
    /// Previous index, -1 when added
    pub old_index: i32,
    /// New index, -1 when removed
    pub new_index: i32,
}

/// Raw query result
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeQuerySnapshot {
    /// Matching documents in result order
    #[serde(default)]
    pub documents: Vec<NativeDocument>,
    /// Changes since the previous snapshot (listeners only)
    #[serde(default)]
    pub changes: Vec<NativeDocumentChange>,
    /// Snapshot level metadata
    #[serde(default)]
    pub metadata: SnapshotMetadata,
}

/// Payload of a listener event: exactly one of error or snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NativeEventBody {
    /// The listener failed; no more events follow
    Error {
        /// Raw error as reported natively
        error: NativeErrorPayload,
    },
    /// A new result set
    Snapshot {
        /// Raw snapshot
        snapshot: NativeQuerySnapshot,
    },
}

/// Event emitted by the native binding for a collection listener
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeEvent {
    /// Listener the event belongs to
    pub listener_id: u64,
    /// Error or snapshot
    pub body: NativeEventBody,
}

impl NativeEvent {
    /// Snapshot event
    pub fn snapshot(listener_id: u64, snapshot: NativeQuerySnapshot) -> Self {
        Self {
            listener_id,
            body: NativeEventBody::Snapshot { snapshot },
        }
    }

    /// Error event
    pub fn error(listener_id: u64, error: NativeErrorPayload) -> Self {
        Self {
            listener_id,
            body: NativeEventBody::Error { error },
        }
    }
}

/// Native Firestore binding
///
/// Implementations deliver listener events by emitting [`NativeEvent`]s on
/// the owning `Firestore`'s emitter under
/// `"{app}-firestore_collection_sync_event:{listener_id}"`.
#[async_trait]
pub trait FirestoreNative: Send + Sync {
    /// Run the query once
    async fn collection_get(
        &self,
        query: &NativeQuery,
        options: &GetOptions,
    ) -> Result<NativeQuerySnapshot, NativeErrorPayload>;

    /// Start streaming results for `listener_id`
    fn collection_on_snapshot(
        &self,
        query: &NativeQuery,
        listener_id: u64,
        options: &SnapshotListenOptions,
    );

    /// Stop streaming results for `listener_id`
    fn collection_off_snapshot(&self, listener_id: u64);

    /// Apply instance settings
    async fn settings(&self, settings: &Settings) -> Result<(), NativeErrorPayload>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_body_deserializes_error_first() {
        let event: NativeEvent = serde_json::from_value(serde_json::json!({
            "listenerId": 4,
            "body": {"error": {"code": "permission-denied", "message": "nope"}}
        }))
        .unwrap();
        assert!(matches!(event.body, NativeEventBody::Error { ref error } if error.code == "permission-denied"));
    }

    #[test]
    fn test_event_body_deserializes_snapshot() {
        let event: NativeEvent = serde_json::from_value(serde_json::json!({
            "listenerId": 1,
            "body": {"snapshot": {
                "documents": [{"path": "cities/SF", "data": {"name": {"type": "string", "value": "SF"}}}],
                "metadata": {"fromCache": true}
            }}
        }))
        .unwrap();
        let NativeEventBody::Snapshot { snapshot } = event.body else {
            panic!("expected snapshot body");
        };
        assert_eq!(snapshot.documents.len(), 1);
        assert!(snapshot.documents[0].exists);
        assert!(snapshot.metadata.from_cache);
    }
}
