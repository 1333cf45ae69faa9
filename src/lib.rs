//! Firebase bridge SDK
//!
//! Query builder and snapshot-listener bridge over native Firestore and
//! Storage bindings. Queries are validated and assembled here; the native
//! binding (a [`firestore::FirestoreNative`] / [`storage::StorageNative`]
//! implementation) executes them and reports results back through an
//! [`emitter::EventEmitter`].
//!
//! # Example
//! ```no_run
//! # async fn example(native: std::sync::Arc<dyn firebase_bridge_sdk::firestore::FirestoreNative>) -> Result<(), Box<dyn std::error::Error>> {
//! use firebase_bridge_sdk::{App, AppOptions};
//! use firebase_bridge_sdk::firestore::{Direction, Firestore};
//!
//! let app = App::create(AppOptions {
//!     api_key: "YOUR_API_KEY".to_string(),
//!     project_id: "your-project-id".to_string(),
//!     ..Default::default()
//! })
//! .await?;
//! let firestore = Firestore::new(app, native);
//!
//! let query = firestore
//!     .collection("cities")?
//!     .query()
//!     .where_field("population", ">", 100_000)?
//!     .order_by("population", Direction::Descending)?
//!     .limit(10)?;
//! let snapshot = query.get(None).await?;
//! println!("{} cities", snapshot.len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod app;
pub mod emitter;
pub mod error;
pub mod firestore;
pub mod storage;

// Re-exports for convenience
pub use app::{App, AppOptions};
pub use error::{FirebaseError, FirestoreError, NativeErrorPayload, NativeFirebaseError, StorageError};
