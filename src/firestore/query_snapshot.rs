//! Firestore QuerySnapshot and DocumentChange types

use super::document_snapshot::{DocumentSnapshot, SnapshotMetadata};
use super::native::{NativeChangeType, NativeDocument, NativeQuerySnapshot};
use super::query::Query;

/// Query snapshot containing multiple documents
#[derive(Clone)]
pub struct QuerySnapshot {
    query: Query,
    documents: Vec<DocumentSnapshot>,
    changes: Vec<DocumentChange>,
    metadata: SnapshotMetadata,
}

impl QuerySnapshot {
    /// Wrap a raw native result produced for `query`
    pub(crate) fn new(query: Query, raw: NativeQuerySnapshot) -> Self {
        let documents = raw.documents.into_iter().map(into_document).collect();
        let changes = raw
            .changes
            .into_iter()
            .map(|change| DocumentChange {
                change_type: change.change_type.into(),
                document: into_document(change.doc),
                old_index: change.old_index,
                new_index: change.new_index,
            })
            .collect();
        Self {
            query,
            documents,
            changes,
            metadata: raw.metadata,
        }
    }

    /// The query that produced this snapshot
    pub fn query(&self) -> &Query {
        &self.query
    }

    /// All documents in result order
    pub fn documents(&self) -> &[DocumentSnapshot] {
        &self.documents
    }

    /// Changes since the previous snapshot of the same listener
    pub fn doc_changes(&self) -> &[DocumentChange] {
        &self.changes
    }

    /// Snapshot metadata
    pub fn metadata(&self) -> SnapshotMetadata {
        self.metadata
    }

    /// Check if the query result is empty
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Get the number of documents in the snapshot
    pub fn len(&self) -> usize {
        self.documents.len()
    }
}

impl std::fmt::Debug for QuerySnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuerySnapshot")
            .field("path", &self.query.path())
            .field("documents", &self.documents)
            .field("metadata", &self.metadata)
            .finish()
    }
}

impl<'a> IntoIterator for &'a QuerySnapshot {
    type Item = &'a DocumentSnapshot;
    type IntoIter = std::slice::Iter<'a, DocumentSnapshot>;

    fn into_iter(self) -> Self::IntoIter {
        self.documents.iter()
    }
}

fn into_document(doc: NativeDocument) -> DocumentSnapshot {
    DocumentSnapshot {
        path: doc.path,
        data: doc.exists.then_some(doc.data),
        metadata: doc.metadata,
    }
}

/// Document change type for snapshot listeners
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentChangeType {
    /// Document was added
    Added,
    /// Document was modified
    Modified,
    /// Document was removed
    Removed,
}

impl From<NativeChangeType> for DocumentChangeType {
    fn from(value: NativeChangeType) -> Self {
        match value {
            NativeChangeType::Added => DocumentChangeType::Added,
            NativeChangeType::Modified => DocumentChangeType::Modified,
            NativeChangeType::Removed => DocumentChangeType::Removed,
        }
    }
}

/// Represents a change to a document in a query snapshot
#[derive(Debug, Clone)]
pub struct DocumentChange {
    /// Type of change
    pub change_type: DocumentChangeType,

    /// The document that changed
    pub document: DocumentSnapshot,

    /// The old index of the document (-1 if added)
    pub old_index: i32,

    /// The new index of the document (-1 if removed)
    pub new_index: i32,
}
