//! Storage client handle and object references

use super::metadata::{validate_metadata, FullMetadata, SettableMetadata};
use super::url::{get_gs_url_parts, get_http_url_parts, GS_PREFIX};
use crate::app::App;
use crate::emitter::{EventEmitter, Subscription};
use crate::error::{FirebaseError, NativeErrorPayload, NativeFirebaseError, StorageError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Namespace storage errors are normalised under
pub const STORAGE_NAMESPACE: &str = "storage";

/// Boundary to the platform storage SDK
#[async_trait]
pub trait StorageNative: Send + Sync {
    /// Read the metadata of the object at `bucket`/`path`
    async fn get_metadata(&self, bucket: &str, path: &str)
        -> Result<FullMetadata, NativeErrorPayload>;

    /// Apply `metadata` to the object at `bucket`/`path`
    async fn update_metadata(
        &self,
        bucket: &str,
        path: &str,
        metadata: &SettableMetadata,
    ) -> Result<FullMetadata, NativeErrorPayload>;
}

/// Task event as delivered by the native binding
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageNativeEvent {
    /// Upload or download task id
    pub task_id: String,
    /// Event name, e.g. `state_changed`
    pub event_name: String,
    /// Raw event body
    #[serde(default)]
    pub body: serde_json::Value,
}

/// Task event after normalisation, as seen by subscribers
#[derive(Debug, Clone, PartialEq)]
pub struct StorageTaskEvent {
    /// Raw event body
    pub body: serde_json::Value,
    /// Error carried in `body.error`, normalised
    pub error: Option<NativeFirebaseError>,
}

/// Storage client
#[derive(Clone)]
pub struct Storage {
    inner: Arc<StorageInner>,
}

struct StorageInner {
    app: App,
    native: Arc<dyn StorageNative>,
    emitter: EventEmitter<StorageTaskEvent>,
}

impl Storage {
    /// Create a Storage instance for `app`
    pub fn new(app: App, native: Arc<dyn StorageNative>) -> Self {
        Self {
            inner: Arc::new(StorageInner {
                app,
                native,
                emitter: EventEmitter::new(),
            }),
        }
    }

    /// Owning app
    pub fn app(&self) -> &App {
        &self.inner.app
    }

    /// Reference to `path` in the app's default bucket
    pub fn reference(&self, path: &str) -> Result<StorageReference, FirebaseError> {
        let bucket = self
            .inner
            .app
            .default_bucket_url()
            .ok_or(StorageError::NoDefaultBucket)?;
        Ok(StorageReference::new(self.clone(), bucket, normalize(path)))
    }

    /// Reference from a `gs://` URL or an HTTP download URL
    pub fn ref_from_url(&self, url: &str) -> Result<StorageReference, FirebaseError> {
        let parts = if url.starts_with(GS_PREFIX) {
            get_gs_url_parts(url)
        } else {
            get_http_url_parts(url).ok_or_else(|| {
                StorageError::InvalidUrl(format!(
                    "storage.refFromURL(*) unable to parse '{}' as a storage url.",
                    url
                ))
            })?
        };
        Ok(StorageReference::new(self.clone(), parts.bucket, normalize(&parts.path)))
    }

    /// Subscribe to events of one task
    pub fn on_task_event<F>(
        &self,
        task_id: &str,
        event_name: &str,
        handler: F,
    ) -> Subscription<StorageTaskEvent>
    where
        F: FnMut(&StorageTaskEvent) + Send + 'static,
    {
        let name = self.inner.app.event_name(&task_event_name(task_id, event_name));
        self.inner.emitter.add_listener(&name, handler)
    }
}

impl fmt::Debug for Storage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Storage")
            .field("app", &self.inner.app.name())
            .finish()
    }
}

/// Normalise a task event and re-emit it to its subscribers
///
/// Returns the number of handlers that received it.
pub fn handle_storage_event(storage: &Storage, event: StorageNativeEvent) -> usize {
    let error = event
        .body
        .get("error")
        .filter(|e| !e.is_null())
        .map(|raw| {
            let payload: NativeErrorPayload =
                serde_json::from_value(raw.clone()).unwrap_or_else(|_| {
                    NativeErrorPayload::new("unknown", raw.to_string())
                });
            NativeFirebaseError::from_event(&payload, STORAGE_NAMESPACE)
        });

    if let Some(err) = &error {
        tracing::warn!(task_id = %event.task_id, error = %err, "storage task reported an error");
    }

    let name = storage
        .inner
        .app
        .event_name(&task_event_name(&event.task_id, &event.event_name));
    storage.inner.emitter.emit(
        &name,
        &StorageTaskEvent {
            body: event.body,
            error,
        },
    )
}

fn task_event_name(task_id: &str, event_name: &str) -> String {
    format!("{}:{}", task_id, event_name)
}

fn normalize(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Reference to an object (or prefix) in a bucket
#[derive(Clone)]
pub struct StorageReference {
    storage: Storage,
    bucket: String,
    path: String,
}

impl StorageReference {
    fn new(storage: Storage, bucket: String, path: String) -> Self {
        Self {
            storage,
            bucket,
            path,
        }
    }

    /// Bucket URL, e.g. `gs://my-app.appspot.com`
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Object path; `/` for the bucket root
    pub fn full_path(&self) -> &str {
        &self.path
    }

    /// Last path segment
    pub fn name(&self) -> &str {
        if self.path == "/" {
            return "";
        }
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// Reference to `path` below this one
    pub fn child(&self, path: &str) -> StorageReference {
        let child = normalize(path);
        let joined = match (self.path.as_str(), child.as_str()) {
            ("/", c) => c.to_string(),
            (p, "/") => p.to_string(),
            (p, c) => format!("{}/{}", p, c),
        };
        StorageReference::new(self.storage.clone(), self.bucket.clone(), joined)
    }

    /// Read the object's metadata
    pub async fn get_metadata(&self) -> Result<FullMetadata, FirebaseError> {
        self.storage
            .inner
            .native
            .get_metadata(&self.bucket, &self.path)
            .await
            .map_err(|p| NativeFirebaseError::from_event(&p, STORAGE_NAMESPACE).into())
    }

    /// Validate `metadata` and apply it to the object
    ///
    /// Validation failures are returned before the native binding is called.
    pub async fn update_metadata(
        &self,
        metadata: &serde_json::Value,
    ) -> Result<FullMetadata, FirebaseError> {
        let settable = validate_metadata(metadata)?;
        let updated = self
            .storage
            .inner
            .native
            .update_metadata(&self.bucket, &self.path, &settable)
            .await
            .map_err(|p| NativeFirebaseError::from_event(&p, STORAGE_NAMESPACE))?;
        tracing::debug!(reference = %self, "object metadata updated");
        Ok(updated)
    }
}

impl fmt::Display for StorageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path == "/" {
            write!(f, "{}/", self.bucket)
        } else {
            write!(f, "{}/{}", self.bucket, self.path)
        }
    }
}

impl fmt::Debug for StorageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageReference")
            .field("bucket", &self.bucket)
            .field("path", &self.path)
            .finish()
    }
}

impl PartialEq for StorageReference {
    fn eq(&self, other: &Self) -> bool {
        self.storage.inner.app.name() == other.storage.inner.app.name()
            && self.bucket == other.bucket
            && self.path == other.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("/a/b/"), "a/b");
        assert_eq!(normalize(""), "/");
        assert_eq!(normalize("///"), "/");
    }

    #[test]
    fn test_task_event_name() {
        assert_eq!(task_event_name("t1", "state_changed"), "t1:state_changed");
    }
}
