//! Firestore CollectionReference type

use super::query::Query;
use super::query_snapshot::QuerySnapshot;
use super::settings::GetOptions;
use crate::error::FirebaseError;

/// Reference to a Firestore collection
///
/// The entry point for building queries: [`CollectionReference::query`]
/// returns the unfiltered query over the collection.
#[derive(Clone, Debug)]
pub struct CollectionReference {
    query: Query,
}

impl CollectionReference {
    pub(crate) fn new(query: Query) -> Self {
        Self { query }
    }

    /// Get collection ID (last segment of path)
    pub fn id(&self) -> &str {
        let path = self.query.path();
        path.rsplit('/').next().unwrap_or(path)
    }

    /// Full collection path
    pub fn path(&self) -> &str {
        self.query.path()
    }

    /// Path of the document this collection is nested under, if any
    pub fn parent_path(&self) -> Option<&str> {
        self.query.path().rsplit_once('/').map(|(parent, _)| parent)
    }

    /// Unfiltered query over the collection
    pub fn query(&self) -> Query {
        self.query.clone()
    }

    /// Read every document in the collection
    pub async fn get(&self, options: Option<GetOptions>) -> Result<QuerySnapshot, FirebaseError> {
        self.query.get(options).await
    }
}

impl From<CollectionReference> for Query {
    fn from(reference: CollectionReference) -> Self {
        reference.query
    }
}
