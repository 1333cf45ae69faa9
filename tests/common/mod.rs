//! Shared fixtures for the integration tests
//!
//! `FakeNative` stands in for the platform binding: it records every call
//! and answers `collection_get` with a canned result.

#![allow(dead_code)]

use async_trait::async_trait;
use firebase_bridge_sdk::firestore::{
    Firestore, FirestoreNative, GetOptions, MapValue, NativeDocument, NativeQuery,
    NativeQuerySnapshot, Settings, SnapshotListenOptions, Value,
};
use firebase_bridge_sdk::storage::{FullMetadata, SettableMetadata, Storage, StorageNative};
use firebase_bridge_sdk::{App, AppOptions, NativeErrorPayload};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

static APP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Route bridge logs to the test writer; set `RUST_LOG=debug` to see them
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Create an app with a name no other test uses
pub async fn unique_app(prefix: &str) -> App {
    init_tracing();
    let n = APP_COUNTER.fetch_add(1, Ordering::SeqCst);
    App::create(AppOptions {
        api_key: "test-api-key".to_string(),
        project_id: "test-project".to_string(),
        app_name: Some(format!("{}-{}", prefix, n)),
        storage_bucket: Some("test-project.appspot.com".to_string()),
    })
    .await
    .expect("app creation succeeds")
}

/// Recording Firestore binding
#[derive(Default)]
pub struct FakeNative {
    pub gets: Mutex<Vec<(NativeQuery, GetOptions)>>,
    pub on_snapshot_calls: Mutex<Vec<(NativeQuery, u64, SnapshotListenOptions)>>,
    pub off_snapshot_calls: Mutex<Vec<u64>>,
    pub settings_calls: Mutex<Vec<Settings>>,
    pub get_error: Mutex<Option<NativeErrorPayload>>,
    pub get_result: Mutex<NativeQuerySnapshot>,
}

impl FakeNative {
    pub fn fail_gets_with(&self, payload: NativeErrorPayload) {
        *self.get_error.lock().unwrap() = Some(payload);
    }

    pub fn answer_gets_with(&self, snapshot: NativeQuerySnapshot) {
        *self.get_result.lock().unwrap() = snapshot;
    }

    pub fn off_calls(&self) -> Vec<u64> {
        self.off_snapshot_calls.lock().unwrap().clone()
    }

    pub fn last_listener_id(&self) -> u64 {
        self.on_snapshot_calls
            .lock()
            .unwrap()
            .last()
            .map(|(_, id, _)| *id)
            .expect("a listener was registered")
    }
}

#[async_trait]
impl FirestoreNative for FakeNative {
    async fn collection_get(
        &self,
        query: &NativeQuery,
        options: &GetOptions,
    ) -> Result<NativeQuerySnapshot, NativeErrorPayload> {
        self.gets.lock().unwrap().push((query.clone(), *options));
        if let Some(err) = self.get_error.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(self.get_result.lock().unwrap().clone())
    }

    fn collection_on_snapshot(
        &self,
        query: &NativeQuery,
        listener_id: u64,
        options: &SnapshotListenOptions,
    ) {
        self.on_snapshot_calls
            .lock()
            .unwrap()
            .push((query.clone(), listener_id, *options));
    }

    fn collection_off_snapshot(&self, listener_id: u64) {
        self.off_snapshot_calls.lock().unwrap().push(listener_id);
    }

    async fn settings(&self, settings: &Settings) -> Result<(), NativeErrorPayload> {
        self.settings_calls.lock().unwrap().push(settings.clone());
        Ok(())
    }
}

/// Firestore wired to a fresh `FakeNative`
pub async fn firestore(prefix: &str) -> (Firestore, Arc<FakeNative>) {
    let native = Arc::new(FakeNative::default());
    let app = unique_app(prefix).await;
    (Firestore::new(app, native.clone()), native)
}

/// Raw document with the given fields
pub fn document(path: &str, fields: Vec<(&str, Value)>) -> NativeDocument {
    NativeDocument {
        path: path.to_string(),
        exists: true,
        data: fields
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect::<MapValue>(),
        metadata: Default::default(),
    }
}

/// Raw snapshot holding `documents`
pub fn snapshot_of(documents: Vec<NativeDocument>) -> NativeQuerySnapshot {
    NativeQuerySnapshot {
        documents,
        ..Default::default()
    }
}

/// Recording Storage binding
#[derive(Default)]
pub struct FakeStorageNative {
    pub updates: Mutex<Vec<(String, String, SettableMetadata)>>,
    pub reads: Mutex<Vec<(String, String)>>,
    pub error: Mutex<Option<NativeErrorPayload>>,
}

#[async_trait]
impl StorageNative for FakeStorageNative {
    async fn get_metadata(
        &self,
        bucket: &str,
        path: &str,
    ) -> Result<FullMetadata, NativeErrorPayload> {
        self.reads
            .lock()
            .unwrap()
            .push((bucket.to_string(), path.to_string()));
        if let Some(err) = self.error.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(FullMetadata {
            bucket: Some(bucket.trim_start_matches("gs://").to_string()),
            full_path: Some(path.to_string()),
            ..Default::default()
        })
    }

    async fn update_metadata(
        &self,
        bucket: &str,
        path: &str,
        metadata: &SettableMetadata,
    ) -> Result<FullMetadata, NativeErrorPayload> {
        self.updates
            .lock()
            .unwrap()
            .push((bucket.to_string(), path.to_string(), metadata.clone()));
        if let Some(err) = self.error.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(FullMetadata {
            full_path: Some(path.to_string()),
            content_type: metadata
                .get("contentType")
                .and_then(|v| v.as_str())
                .map(str::to_string),
            ..Default::default()
        })
    }
}

/// Storage wired to a fresh `FakeStorageNative`
pub async fn storage(prefix: &str) -> (Storage, Arc<FakeStorageNative>) {
    let native = Arc::new(FakeStorageNative::default());
    let app = unique_app(prefix).await;
    (Storage::new(app, native.clone()), native)
}
