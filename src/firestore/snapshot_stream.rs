//! Snapshot listener stream for Firestore queries.
//!
//! Wraps a [`ListenerRegistration`] into an async stream. The stream
//! removes the listener when dropped.
//!
//! # Example
//! ```no_run
//! use firebase_bridge_sdk::firestore::{Firestore, MetadataChanges};
//! use futures::StreamExt;
//!
//! # async fn example(firestore: Firestore) -> Result<(), Box<dyn std::error::Error>> {
//! let query = firestore.collection("cities")?.query().where_field("state", "==", "CA")?;
//!
//! let mut stream = query.listen(MetadataChanges::Include)?;
//! while let Some(result) = stream.next().await {
//!     match result {
//!         Ok(snapshot) => println!("Query results: {} documents", snapshot.len()),
//!         Err(e) => eprintln!("Error: {}", e),
//!     }
//! }
//! // Listener removed on drop
//! # Ok(())
//! # }
//! ```
use super::listener::ListenerRegistration;
use crate::error::FirebaseError;
use crate::firestore::query_snapshot::QuerySnapshot;
use futures::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;

/// A stream of query snapshot updates.
///
/// This stream receives real-time updates for a query result set.
/// When dropped, the underlying listener is removed.
pub struct QuerySnapshotStream {
    receiver: mpsc::UnboundedReceiver<Result<QuerySnapshot, FirebaseError>>,
    registration: ListenerRegistration,
}

impl QuerySnapshotStream {
    pub(crate) fn new(
        receiver: mpsc::UnboundedReceiver<Result<QuerySnapshot, FirebaseError>>,
        registration: ListenerRegistration,
    ) -> Self {
        Self {
            receiver,
            registration,
        }
    }

    /// Native listener id backing this stream
    pub fn listener_id(&self) -> u64 {
        self.registration.listener_id()
    }
}

impl Stream for QuerySnapshotStream {
    type Item = Result<QuerySnapshot, FirebaseError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

impl Drop for QuerySnapshotStream {
    fn drop(&mut self) {
        self.registration.remove();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{App, AppOptions};
    use crate::error::NativeErrorPayload;
    use crate::firestore::{
        Firestore, FirestoreNative, GetOptions, MetadataChanges, NativeEvent, NativeQuery,
        NativeQuerySnapshot, Settings, SnapshotListenOptions,
    };
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio_test::{assert_pending, assert_ready, task};

    #[derive(Default)]
    struct CountingNative {
        off: AtomicUsize,
    }

    #[async_trait]
    impl FirestoreNative for CountingNative {
        async fn collection_get(
            &self,
            _query: &NativeQuery,
            _options: &GetOptions,
        ) -> Result<NativeQuerySnapshot, NativeErrorPayload> {
            Ok(NativeQuerySnapshot::default())
        }

        fn collection_on_snapshot(
            &self,
            _query: &NativeQuery,
            _listener_id: u64,
            _options: &SnapshotListenOptions,
        ) {
        }

        fn collection_off_snapshot(&self, _listener_id: u64) {
            self.off.fetch_add(1, Ordering::SeqCst);
        }

        async fn settings(&self, _settings: &Settings) -> Result<(), NativeErrorPayload> {
            Ok(())
        }
    }

    #[test]
    fn test_stream_wakes_on_event_and_removes_on_drop() {
        let app = tokio_test::block_on(App::create(AppOptions {
            api_key: "k".to_string(),
            project_id: "p".to_string(),
            app_name: Some("snapshot-stream-unit".to_string()),
            ..Default::default()
        }))
        .unwrap();
        let native = Arc::new(CountingNative::default());
        let firestore = Firestore::new(app, native.clone());

        let stream = firestore
            .collection("cities")
            .unwrap()
            .query()
            .listen(MetadataChanges::Exclude)
            .unwrap();
        let listener_id = stream.listener_id();
        let mut stream = task::spawn(stream);

        assert_pending!(stream.poll_next());
        firestore.deliver(&NativeEvent::snapshot(listener_id, NativeQuerySnapshot::default()));
        assert!(stream.is_woken());

        let item = assert_ready!(stream.poll_next());
        assert!(item.unwrap().unwrap().is_empty());

        drop(stream);
        assert_eq!(native.off.load(Ordering::SeqCst), 1);
    }
}
