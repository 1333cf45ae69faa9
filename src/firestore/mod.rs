//! Cloud Firestore module
//!
//! Module layout:
//! - `field_path.rs`, `field_value.rs`: FieldPath and Value
//! - `modifiers.rs`: immutable query constraints and their validation
//! - `query.rs`, `collection_reference.rs`: the query builder
//! - `cursor.rs`: cursor resolution from snapshots or field values
//! - `snapshot_args.rs`, `listener.rs`, `snapshot_stream.rs`: snapshot listeners
//! - `native.rs`: the boundary to the native binding

pub mod collection_reference;
pub mod cursor;
pub mod document_snapshot;
pub mod field_path;
pub mod field_value;
/// Metadata change tracking for real-time listeners
pub mod metadata_changes;
pub mod modifiers;
pub mod native;
pub mod query;
pub mod query_snapshot;
pub mod settings;
pub mod snapshot_args;
/// Stream utilities for query snapshots
pub mod snapshot_stream;

/// Core Firestore client
#[allow(clippy::module_inception)]
pub mod firestore;
pub mod listener;

// Re-export main Firestore client
pub use firestore::{deliver_event, Firestore};

pub use collection_reference::CollectionReference;
pub use cursor::{CursorAnchor, CursorArg};
pub use document_snapshot::{DocumentSnapshot, SnapshotMetadata};
pub use field_path::{FieldPath, FieldPathArg};
pub use field_value::{MapValue, Value};
pub use listener::ListenerRegistration;
pub use metadata_changes::{MetadataChanges, SnapshotListenOptions};
pub use modifiers::{CursorKind, Direction, Filter, Modifiers, Operator, Order, QueryOptions, QueryType};
pub use native::{
    FirestoreNative, NativeChangeType, NativeDocument, NativeDocumentChange, NativeEvent,
    NativeEventBody, NativeQuery, NativeQuerySnapshot,
};
pub use query::Query;
pub use query_snapshot::{DocumentChange, DocumentChangeType, QuerySnapshot};
pub use settings::{GetOptions, Settings, Source};
pub use snapshot_args::{ParsedSnapshotArgs, SnapshotArgs, SnapshotObserver};
pub use snapshot_stream::QuerySnapshotStream;
