//! Cloud Storage module
//!
//! Object references, metadata validation and URL parsing. Transfers are
//! left to the native binding.

pub mod metadata;
#[allow(clippy::module_inception)]
pub mod storage;
pub mod url;

pub use metadata::{validate_metadata, FullMetadata, SettableMetadata, SETTABLE_FIELDS};
pub use storage::{
    handle_storage_event, Storage, StorageNative, StorageNativeEvent, StorageReference,
    StorageTaskEvent, STORAGE_NAMESPACE,
};
pub use url::{get_gs_url_parts, get_http_url_parts, UrlParts};
