//! Firebase error types
//!
//! Provides a unified error type hierarchy for the bridge.
//!
//! # Design
//! Uses thiserror for ergonomic error definitions. Validation failures are
//! raised synchronously as [`FirestoreError`] / [`StorageError`] with the
//! originating call signature prefixed to the message. Errors coming back
//! from the native binding (rejected futures or event payloads) are all
//! normalised into [`NativeFirebaseError`] before they reach user code.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Top-level Firebase error type
///
/// Wraps specific error types (Firestore, Storage, native) into a unified type.
/// Supports conversion from all module-specific errors via `From` trait.
///
/// # Example
/// ```
/// use firebase_bridge_sdk::{FirebaseError, FirestoreError};
///
/// let err: FirebaseError = FirestoreError::InvalidArgument("bad".into()).into();
/// ```
#[derive(Debug, Error)]
pub enum FirebaseError {
    /// Firestore-related errors
    #[error("Firestore error: {0}")]
    Firestore(#[from] FirestoreError),

    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Error reported by the native binding, normalised
    #[error("{0}")]
    Native(#[from] NativeFirebaseError),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),

    /// API key not configured
    #[error("API key not configured")]
    ApiKeyNotConfigured,
}

/// Firestore errors
///
/// Maps Firestore error codes to Rust enum variants. `InvalidArgument` is
/// also the variant every client-side validation failure uses.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FirestoreError {
    /// Operation cancelled
    #[error("Operation cancelled")]
    Cancelled,

    /// Document not found
    #[error("Document not found")]
    NotFound,

    /// Permission denied
    #[error("Permission denied")]
    PermissionDenied,

    /// Resource already exists
    #[error("Resource already exists")]
    AlreadyExists,

    /// Resource exhausted (e.g., quota exceeded)
    #[error("Resource exhausted")]
    ResourceExhausted,

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Failed precondition (e.g. missing index)
    #[error("Failed precondition: {0}")]
    FailedPrecondition(String),

    /// Deadline exceeded
    #[error("Deadline exceeded")]
    DeadlineExceeded,

    /// Operation was aborted
    #[error("Operation aborted")]
    Aborted,

    /// Out of range error
    #[error("Out of range: {0}")]
    OutOfRange(String),

    /// Unimplemented feature
    #[error("Feature not implemented")]
    Unimplemented,

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Service unavailable
    #[error("Service unavailable")]
    Unavailable,

    /// Data loss or corruption
    #[error("Data loss")]
    DataLoss,

    /// Unauthenticated
    #[error("Unauthenticated")]
    Unauthenticated,

    /// Unknown error with code
    #[error("Unknown Firestore error: {0}")]
    Unknown(String),
}

/// Storage errors raised on the client side
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Invalid argument (metadata validation and friends)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A storage URL could not be parsed
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// No bucket configured on the app and none given
    #[error("No default bucket configured")]
    NoDefaultBucket,
}

/// Raw error payload as delivered by the native binding
///
/// This is the shape found in `event.body.error` and in rejected native
/// futures. It is kept verbatim inside [`NativeFirebaseError`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeErrorPayload {
    /// Firebase error code without namespace, e.g. `permission-denied`
    #[serde(default)]
    pub code: String,
    /// Human readable message
    #[serde(default)]
    pub message: String,
    /// Platform specific code (Android / iOS)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native_error_code: Option<String>,
    /// Platform specific message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native_error_message: Option<String>,
}

impl NativeErrorPayload {
    /// Create a payload from a code and message
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            ..Default::default()
        }
    }
}

/// Normalised error coming from the native layer
///
/// Displayed as `[namespace/code] message`. The original payload is kept
/// so nothing reported by the native side is lost.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("[{namespace}/{code}] {message}")]
pub struct NativeFirebaseError {
    /// Module namespace, e.g. `firestore` or `storage`
    pub namespace: String,
    /// Error code without the namespace
    pub code: String,
    /// Message
    pub message: String,
    /// Payload exactly as delivered by the native binding
    pub payload: NativeErrorPayload,
}

impl NativeFirebaseError {
    /// Normalise an error payload delivered through an event or a rejected
    /// native call.
    pub fn from_event(payload: &NativeErrorPayload, namespace: &str) -> Self {
        let code = if payload.code.is_empty() {
            "unknown".to_string()
        } else {
            payload.code.clone()
        };
        Self {
            namespace: namespace.to_string(),
            code,
            message: payload.message.clone(),
            payload: payload.clone(),
        }
    }

    /// Fully qualified code, e.g. `firestore/permission-denied`
    pub fn full_code(&self) -> String {
        format!("{}/{}", self.namespace, self.code)
    }

    /// Typed view of a Firestore error code
    pub fn to_firestore_error(&self) -> FirestoreError {
        FirestoreError::from_code(&self.code, &self.message)
    }
}

impl FirebaseError {
    /// Create an internal error from a string
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Firestore(err) => err.is_retryable(),
            Self::Native(err) if err.namespace == "firestore" => {
                err.to_firestore_error().is_retryable()
            }
            Self::Native(err) => matches!(err.code.as_str(), "retry-limit-exceeded" | "unknown"),
            _ => false,
        }
    }

    /// Check if error indicates authentication is required
    pub fn requires_auth(&self) -> bool {
        match self {
            Self::Firestore(FirestoreError::Unauthenticated) => true,
            Self::Native(err) => matches!(err.code.as_str(), "unauthenticated" | "unauthorized"),
            _ => false,
        }
    }
}

impl FirestoreError {
    /// Create from a Firebase string error code (`not-found`, `aborted`, ...)
    pub fn from_code(code: &str, message: &str) -> Self {
        match code {
            "cancelled" => Self::Cancelled,
            "invalid-argument" => Self::InvalidArgument(message.to_string()),
            "deadline-exceeded" => Self::DeadlineExceeded,
            "not-found" => Self::NotFound,
            "already-exists" => Self::AlreadyExists,
            "permission-denied" => Self::PermissionDenied,
            "resource-exhausted" => Self::ResourceExhausted,
            "failed-precondition" => Self::FailedPrecondition(message.to_string()),
            "aborted" => Self::Aborted,
            "out-of-range" => Self::OutOfRange(message.to_string()),
            "unimplemented" => Self::Unimplemented,
            "internal" => Self::Internal(message.to_string()),
            "unavailable" => Self::Unavailable,
            "data-loss" => Self::DataLoss,
            "unauthenticated" => Self::Unauthenticated,
            other => Self::Unknown(other.to_string()),
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Unavailable | Self::DeadlineExceeded | Self::ResourceExhausted | Self::Aborted
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_firestore_error_into_firebase_error() {
        let fs_err = FirestoreError::NotFound;
        let firebase_err: FirebaseError = fs_err.into();

        assert!(matches!(firebase_err, FirebaseError::Firestore(FirestoreError::NotFound)));
    }

    #[test]
    fn test_native_error_normalisation_is_lossless() {
        let payload = NativeErrorPayload {
            code: "permission-denied".to_string(),
            message: "Missing or insufficient permissions.".to_string(),
            native_error_code: Some("7".to_string()),
            native_error_message: Some("PERMISSION_DENIED".to_string()),
        };
        let err = NativeFirebaseError::from_event(&payload, "firestore");

        assert_eq!(err.full_code(), "firestore/permission-denied");
        assert_eq!(err.payload, payload);
        assert_eq!(
            err.to_string(),
            "[firestore/permission-denied] Missing or insufficient permissions."
        );
        assert_eq!(err.to_firestore_error(), FirestoreError::PermissionDenied);
    }

    #[test]
    fn test_native_error_without_code() {
        let err = NativeFirebaseError::from_event(&NativeErrorPayload::default(), "storage");
        assert_eq!(err.code, "unknown");
    }

    #[test]
    fn test_is_retryable() {
        assert!(FirebaseError::Firestore(FirestoreError::Unavailable).is_retryable());
        assert!(!FirebaseError::Firestore(FirestoreError::NotFound).is_retryable());

        let native = NativeFirebaseError::from_event(
            &NativeErrorPayload::new("unavailable", "offline"),
            "firestore",
        );
        assert!(FirebaseError::Native(native).is_retryable());
    }

    #[test]
    fn test_requires_auth() {
        assert!(FirebaseError::Firestore(FirestoreError::Unauthenticated).requires_auth());
        assert!(!FirebaseError::Firestore(FirestoreError::NotFound).requires_auth());
    }

    #[test]
    fn test_firestore_error_from_code() {
        assert_eq!(FirestoreError::from_code("not-found", ""), FirestoreError::NotFound);
        assert_eq!(
            FirestoreError::from_code("failed-precondition", "index"),
            FirestoreError::FailedPrecondition("index".to_string())
        );
        assert_eq!(
            FirestoreError::from_code("weird", ""),
            FirestoreError::Unknown("weird".to_string())
        );
    }

    #[test]
    fn test_error_display() {
        let err = FirebaseError::Firestore(FirestoreError::InvalidArgument("x".to_string()));
        let display = format!("{}", err);
        assert!(display.contains("Firestore error"));
        assert!(display.contains("Invalid argument: x"));
    }

    #[test]
    fn test_payload_deserializes_from_camel_case() {
        let payload: NativeErrorPayload = serde_json::from_value(serde_json::json!({
            "code": "unavailable",
            "message": "offline",
            "nativeErrorCode": "14"
        }))
        .unwrap();
        assert_eq!(payload.native_error_code.as_deref(), Some("14"));
        assert_eq!(payload.native_error_message, None);
    }
}
