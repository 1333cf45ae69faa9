//! Firestore client handle
//!
//! Owns the app, the native binding and the event emitter the binding
//! delivers listener events through. Cloning is cheap.

use super::collection_reference::CollectionReference;
use super::listener::sync_event_name;
use super::modifiers::{Modifiers, QueryType};
use super::native::{FirestoreNative, NativeEvent};
use super::query::Query;
use super::settings::Settings;
use crate::app::App;
use crate::emitter::EventEmitter;
use crate::error::{FirebaseError, FirestoreError, NativeFirebaseError};
use std::sync::Arc;

/// Firestore database client
#[derive(Clone)]
pub struct Firestore {
    pub(crate) inner: Arc<FirestoreInner>,
}

pub(crate) struct FirestoreInner {
    app: App,
    native: Arc<dyn FirestoreNative>,
    emitter: EventEmitter<NativeEvent>,
}

impl Firestore {
    /// Create a Firestore instance with its own emitter
    pub fn new(app: App, native: Arc<dyn FirestoreNative>) -> Self {
        Self::with_emitter(app, native, EventEmitter::new())
    }

    /// Create a Firestore instance sharing `emitter` with the native binding
    ///
    /// The binding keeps a clone of the emitter and delivers listener events
    /// through [`Firestore::deliver`] or [`deliver_event`].
    pub fn with_emitter(
        app: App,
        native: Arc<dyn FirestoreNative>,
        emitter: EventEmitter<NativeEvent>,
    ) -> Self {
        Self {
            inner: Arc::new(FirestoreInner {
                app,
                native,
                emitter,
            }),
        }
    }

    /// Owning app
    pub fn app(&self) -> &App {
        &self.inner.app
    }

    /// Listener event channel
    pub fn emitter(&self) -> &EventEmitter<NativeEvent> {
        &self.inner.emitter
    }

    pub(crate) fn native(&self) -> Arc<dyn FirestoreNative> {
        Arc::clone(&self.inner.native)
    }

    /// Deliver a native listener event to its subscribers
    pub fn deliver(&self, event: &NativeEvent) -> usize {
        deliver_event(&self.inner.emitter, &self.inner.app, event)
    }

    /// Reference to the collection at `path`
    ///
    /// The path must have an odd number of segments, e.g. `users` or
    /// `users/alice/posts`.
    pub fn collection(&self, path: &str) -> Result<CollectionReference, FirebaseError> {
        let path = normalize_path(path).map_err(|e| invalid("collection(*)", e))?;
        if path.split('/').count() % 2 == 0 {
            return Err(invalid(
                "collection(*)",
                "'collectionPath' must point to a collection.",
            ));
        }
        Ok(CollectionReference::new(Query::new(
            self.clone(),
            path,
            Modifiers::new(QueryType::Collection),
        )))
    }

    /// Query over every collection whose id is `collection_id`
    pub fn collection_group(&self, collection_id: &str) -> Result<Query, FirebaseError> {
        if collection_id.is_empty() {
            return Err(invalid(
                "collectionGroup(*)",
                "'collectionId' must be a non-empty string.",
            ));
        }
        if collection_id.contains('/') {
            return Err(invalid(
                "collectionGroup(*)",
                "'collectionId' must not contain '/'.",
            ));
        }
        Ok(Query::new(
            self.clone(),
            collection_id.to_string(),
            Modifiers::new(QueryType::CollectionGroup),
        ))
    }

    /// Validate `settings` and apply them through the native binding
    pub async fn settings(&self, settings: Settings) -> Result<(), FirebaseError> {
        settings.validate().map_err(|e| invalid("settings(*)", e))?;
        self.inner
            .native
            .settings(&settings)
            .await
            .map_err(|payload| NativeFirebaseError::from_event(&payload, "firestore"))?;
        tracing::debug!(app = %self.app().name(), host = %settings.host, "firestore settings applied");
        Ok(())
    }
}

/// Deliver `event` on `emitter` under the name `app` scopes it to
///
/// For native bindings that hold the emitter but not the `Firestore`.
pub fn deliver_event(emitter: &EventEmitter<NativeEvent>, app: &App, event: &NativeEvent) -> usize {
    let name = app.event_name(&sync_event_name(event.listener_id));
    let delivered = emitter.emit(&name, event);
    if delivered == 0 {
        tracing::trace!(listener_id = event.listener_id, "no subscriber for native event");
    }
    delivered
}

fn invalid(signature: &str, message: impl std::fmt::Display) -> FirebaseError {
    FirestoreError::InvalidArgument(format!("firestore().{} {}", signature, message)).into()
}

fn normalize_path(path: &str) -> Result<String, String> {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        return Err("'collectionPath' must be a non-empty string.".to_string());
    }
    if trimmed.contains("//") {
        return Err("'collectionPath' contains an empty path segment.".to_string());
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("/users/").unwrap(), "users");
        assert!(normalize_path("").is_err());
        assert!(normalize_path("/").is_err());
        assert!(normalize_path("users//x/posts").is_err());
    }
}
