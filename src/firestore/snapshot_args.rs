//! Calling conventions accepted by `Query::on_snapshot`
//!
//! Callers may pass one combined callback, a success/error pair, an
//! observer with named callbacks, or any of those preceded by listen
//! options. [`SnapshotArgs::parse`] turns all of them into one
//! [`ParsedSnapshotArgs`] so the subscribe logic only sees a single shape.

use super::metadata_changes::SnapshotListenOptions;
use super::query_snapshot::QuerySnapshot;
use crate::error::NativeFirebaseError;

/// Callback receiving either a snapshot or an error
pub type SnapshotCallback =
    Box<dyn FnMut(Result<&QuerySnapshot, &NativeFirebaseError>) + Send + 'static>;
/// Callback receiving snapshots only
pub type NextCallback = Box<dyn FnMut(&QuerySnapshot) + Send + 'static>;
/// Callback receiving errors only
pub type ErrorCallback = Box<dyn FnMut(&NativeFirebaseError) + Send + 'static>;

/// Observer with named callbacks
#[derive(Default)]
pub struct SnapshotObserver {
    /// Called with every snapshot
    pub next: Option<NextCallback>,
    /// Called when the listener fails
    pub error: Option<ErrorCallback>,
}

/// Raw `on_snapshot` arguments
pub enum SnapshotArgs {
    /// One callback for both outcomes
    Callback(SnapshotCallback),
    /// Positional success and optional error callbacks
    Functions {
        /// Success callback
        on_next: NextCallback,
        /// Error callback
        on_error: Option<ErrorCallback>,
    },
    /// Named callbacks
    Observer(SnapshotObserver),
    /// Listen options followed by one of the other forms
    WithOptions(SnapshotListenOptions, Box<SnapshotArgs>),
}

/// Canonical form of [`SnapshotArgs`]
pub struct ParsedSnapshotArgs {
    /// Options forwarded to the native listener
    pub options: SnapshotListenOptions,
    /// Combined callback (no-op when not supplied)
    pub callback: SnapshotCallback,
    /// Success callback (no-op when not supplied)
    pub on_next: NextCallback,
    /// Error callback (no-op when not supplied)
    pub on_error: ErrorCallback,
}

impl SnapshotArgs {
    /// One callback for both outcomes
    pub fn callback<F>(f: F) -> Self
    where
        F: FnMut(Result<&QuerySnapshot, &NativeFirebaseError>) + Send + 'static,
    {
        SnapshotArgs::Callback(Box::new(f))
    }

    /// Success callback only
    pub fn next<N>(on_next: N) -> Self
    where
        N: FnMut(&QuerySnapshot) + Send + 'static,
    {
        SnapshotArgs::Functions {
            on_next: Box::new(on_next),
            on_error: None,
        }
    }

    /// Success and error callbacks
    pub fn next_error<N, E>(on_next: N, on_error: E) -> Self
    where
        N: FnMut(&QuerySnapshot) + Send + 'static,
        E: FnMut(&NativeFirebaseError) + Send + 'static,
    {
        SnapshotArgs::Functions {
            on_next: Box::new(on_next),
            on_error: Some(Box::new(on_error)),
        }
    }

    /// Named callbacks
    pub fn observer(observer: SnapshotObserver) -> Self {
        SnapshotArgs::Observer(observer)
    }

    /// Prefix `args` with listen options
    pub fn with_options(options: impl Into<SnapshotListenOptions>, args: SnapshotArgs) -> Self {
        SnapshotArgs::WithOptions(options.into(), Box::new(args))
    }

    /// Resolve the calling convention
    pub fn parse(self) -> Result<ParsedSnapshotArgs, String> {
        let mut parsed = ParsedSnapshotArgs {
            options: SnapshotListenOptions::default(),
            callback: Box::new(|_| {}),
            on_next: Box::new(|_| {}),
            on_error: Box::new(|_| {}),
        };

        let callbacks = match self {
            SnapshotArgs::WithOptions(options, inner) => {
                if matches!(*inner, SnapshotArgs::WithOptions(..)) {
                    return Err("'options' may only be provided once.".to_string());
                }
                parsed.options = options;
                *inner
            }
            other => other,
        };

        match callbacks {
            SnapshotArgs::Callback(callback) => parsed.callback = callback,
            SnapshotArgs::Functions { on_next, on_error } => {
                parsed.on_next = on_next;
                if let Some(on_error) = on_error {
                    parsed.on_error = on_error;
                }
            }
            SnapshotArgs::Observer(SnapshotObserver { next, error }) => {
                if next.is_none() && error.is_none() {
                    return Err(
                        "'observer' expected at least a 'next' or 'error' callback.".to_string()
                    );
                }
                if let Some(next) = next {
                    parsed.on_next = next;
                }
                if let Some(error) = error {
                    parsed.on_error = error;
                }
            }
            SnapshotArgs::WithOptions(..) => {
                return Err("'options' may only be provided once.".to_string());
            }
        }

        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::firestore::metadata_changes::MetadataChanges;

    #[test]
    fn test_callback_form() {
        let parsed = SnapshotArgs::callback(|_| {}).parse().unwrap();
        assert_eq!(parsed.options, SnapshotListenOptions::default());
    }

    #[test]
    fn test_options_then_functions() {
        let parsed = SnapshotArgs::with_options(
            MetadataChanges::Include,
            SnapshotArgs::next_error(|_| {}, |_| {}),
        )
        .parse()
        .unwrap();
        assert!(parsed.options.include_metadata_changes);
    }

    #[test]
    fn test_nested_options_rejected() {
        let args = SnapshotArgs::with_options(
            MetadataChanges::Include,
            SnapshotArgs::with_options(MetadataChanges::Exclude, SnapshotArgs::next(|_| {})),
        );
        let err = args.parse().err().unwrap();
        assert!(err.contains("only be provided once"));
    }

    #[test]
    fn test_empty_observer_rejected() {
        let err = SnapshotArgs::observer(SnapshotObserver::default())
            .parse()
            .err()
            .unwrap();
        assert!(err.contains("'next' or 'error'"));
    }

    #[test]
    fn test_observer_with_error_only() {
        let observer = SnapshotObserver {
            next: None,
            error: Some(Box::new(|_| {})),
        };
        assert!(SnapshotArgs::observer(observer).parse().is_ok());
    }
}
