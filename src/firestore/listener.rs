//! Snapshot listener bridge
//!
//! Turns the native event channel into a callback subscription:
//! - each `on_snapshot` call gets a fresh process-wide listener id
//! - an emitter handler is added under the app scoped event name for that id
//! - the native binding is told to start streaming for the id
//!
//! Removing the registration drops the handler and tells the native
//! binding to stop. Removal is idempotent.

use super::native::{FirestoreNative, NativeEvent, NativeEventBody, COLLECTION_SYNC_EVENT};
use super::query::Query;
use super::query_snapshot::QuerySnapshot;
use super::snapshot_args::ParsedSnapshotArgs;
use crate::emitter::Subscription;
use crate::error::NativeFirebaseError;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_LISTENER_ID: AtomicU64 = AtomicU64::new(0);

fn next_listener_id() -> u64 {
    NEXT_LISTENER_ID.fetch_add(1, Ordering::SeqCst)
}

/// Event name (before app scoping) for a listener id
pub fn sync_event_name(listener_id: u64) -> String {
    format!("{}:{}", COLLECTION_SYNC_EVENT, listener_id)
}

/// Handle for a live snapshot listener
///
/// Dropping the handle does not stop the listener; call
/// [`ListenerRegistration::remove`].
#[must_use = "the listener keeps running until `remove` is called"]
pub struct ListenerRegistration {
    listener_id: u64,
    active: Arc<AtomicBool>,
    subscription: Subscription<NativeEvent>,
    native: Arc<dyn FirestoreNative>,
}

impl ListenerRegistration {
    /// Native listener id
    pub fn listener_id(&self) -> u64 {
        self.listener_id
    }

    /// Whether events are still delivered
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Stop the listener. Calling this again has no effect.
    pub fn remove(&self) {
        if !self.active.swap(false, Ordering::SeqCst) {
            tracing::trace!(listener_id = self.listener_id, "listener already removed");
            return;
        }
        self.subscription.remove();
        self.native.collection_off_snapshot(self.listener_id);
        tracing::debug!(listener_id = self.listener_id, "snapshot listener removed");
    }
}

impl std::fmt::Debug for ListenerRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerRegistration")
            .field("listener_id", &self.listener_id)
            .field("active", &self.is_active())
            .finish()
    }
}

/// Register a listener for `query` and start the native stream
pub(crate) fn subscribe(query: &Query, args: ParsedSnapshotArgs) -> ListenerRegistration {
    let ParsedSnapshotArgs {
        options,
        mut callback,
        mut on_next,
        mut on_error,
    } = args;

    let firestore = query.firestore().clone();
    let listener_id = next_listener_id();
    let active = Arc::new(AtomicBool::new(true));
    let event_name = firestore.app().event_name(&sync_event_name(listener_id));

    let handler_active = Arc::clone(&active);
    let handler_query = query.clone();
    let subscription = firestore
        .emitter()
        .add_listener(event_name, move |event: &NativeEvent| {
            if !handler_active.load(Ordering::SeqCst) {
                tracing::trace!(listener_id, "dropping event for removed listener");
                return;
            }
            match &event.body {
                NativeEventBody::Error { error } => {
                    let error = NativeFirebaseError::from_event(error, "firestore");
                    tracing::debug!(listener_id, code = %error.code, "snapshot listener error");
                    callback(Err(&error));
                    on_error(&error);
                }
                NativeEventBody::Snapshot { snapshot } => {
                    let snapshot = QuerySnapshot::new(handler_query.clone(), snapshot.clone());
                    callback(Ok(&snapshot));
                    on_next(&snapshot);
                }
            }
        });

    let native = firestore.native();
    native.collection_on_snapshot(&query.to_native(), listener_id, &options);
    tracing::debug!(listener_id, path = %query.path(), "snapshot listener registered");

    ListenerRegistration {
        listener_id,
        active,
        subscription,
        native,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listener_ids_increase() {
        let a = next_listener_id();
        let b = next_listener_id();
        assert!(b > a);
    }

    #[test]
    fn test_sync_event_name() {
        assert_eq!(sync_event_name(12), "firestore_collection_sync_event:12");
    }
}
