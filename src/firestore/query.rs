//! Firestore Query
//!
//! Query is immutable: each builder method validates its arguments and
//! returns a new Query wrapping new [`Modifiers`]. On failure the caller
//! gets an error and the source Query is unchanged, so a half-applied
//! query can never be observed.
//!
//! Validation messages are prefixed with the call signature of the method
//! that rejected them, e.g. `firestore().collection().where(_, *)`.

use super::cursor::{self, CursorAnchor};
use super::field_path::FieldPathArg;
use super::field_value::Value;
use super::firestore::Firestore;
use super::listener::{self, ListenerRegistration};
use super::metadata_changes::SnapshotListenOptions;
use super::modifiers::{CursorKind, Direction, Modifiers, Operator};
use super::native::NativeQuery;
use super::query_snapshot::QuerySnapshot;
use super::settings::{GetOptions, Source};
use super::snapshot_args::SnapshotArgs;
use super::snapshot_stream::QuerySnapshotStream;
use crate::error::{FirebaseError, FirestoreError, NativeFirebaseError};
use tokio::sync::mpsc;

const CALL_PREFIX: &str = "firestore().collection()";

fn invalid(signature: &str, message: impl std::fmt::Display) -> FirebaseError {
    FirestoreError::InvalidArgument(format!("{}.{} {}", CALL_PREFIX, signature, message)).into()
}

/// Immutable Firestore query over one collection (or collection group)
#[derive(Clone)]
pub struct Query {
    firestore: Firestore,
    path: String,
    modifiers: Modifiers,
}

impl Query {
    pub(crate) fn new(firestore: Firestore, path: String, modifiers: Modifiers) -> Self {
        Self {
            firestore,
            path,
            modifiers,
        }
    }

    fn with_modifiers(&self, modifiers: Modifiers) -> Self {
        Self {
            firestore: self.firestore.clone(),
            path: self.path.clone(),
            modifiers,
        }
    }

    /// Owning Firestore instance
    pub fn firestore(&self) -> &Firestore {
        &self.firestore
    }

    /// Collection path (or collection id for a collection group)
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Accumulated constraints
    pub fn modifiers(&self) -> &Modifiers {
        &self.modifiers
    }

    /// Filter documents on `field_path op value`
    ///
    /// `op` is one of `==`, `>`, `>=`, `<`, `<=`, `array-contains`.
    /// `Value::Null` may only be compared with `==`.
    ///
    /// # Example
    /// ```no_run
    /// # use firebase_bridge_sdk::firestore::Firestore;
    /// # fn example(firestore: Firestore) -> Result<(), firebase_bridge_sdk::FirebaseError> {
    /// let adults = firestore
    ///     .collection("users")?
    ///     .query()
    ///     .where_field("age", ">=", 18)?
    ///     .order_by("age", Default::default())?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn where_field(
        &self,
        field_path: impl Into<FieldPathArg>,
        op: &str,
        value: impl Into<Value>,
    ) -> Result<Query, FirebaseError> {
        let path = field_path
            .into()
            .resolve()
            .map_err(|e| invalid("where(*)", format!("'fieldPath' {}.", e)))?;

        let operator: Operator = op.parse().map_err(|_| {
            invalid(
                "where(_, *)",
                "'opStr' is invalid. Expected one of '==', '>', '>=', '<', '<=' or 'array-contains'.",
            )
        })?;

        let value = value.into();
        if value.is_null() && operator != Operator::Equal {
            return Err(invalid(
                "where(_, _, *)",
                "'value' is invalid. You can only perform equals comparisons on null",
            ));
        }

        let modifiers = self.modifiers.with_filter(path, operator, value);
        modifiers
            .validate_where()
            .map_err(|e| invalid("where()", e))?;

        Ok(self.with_modifiers(modifiers))
    }

    /// Order results by `field_path`
    ///
    /// Orderings must be added before any cursor.
    pub fn order_by(
        &self,
        field_path: impl Into<FieldPathArg>,
        direction: Direction,
    ) -> Result<Query, FirebaseError> {
        let path = field_path
            .into()
            .resolve()
            .map_err(|e| invalid("orderBy(*)", format!("'fieldPath' {}.", e)))?;

        if self.modifiers.has_start() {
            return Err(invalid(
                "orderBy()",
                "Invalid query. You must not call startAt() or startAfter() before calling orderBy().",
            ));
        }
        if self.modifiers.has_end() {
            return Err(invalid(
                "orderBy()",
                "Invalid query. You must not call endAt() or endBefore() before calling orderBy().",
            ));
        }

        let modifiers = self.modifiers.with_order(path, direction);
        modifiers
            .validate_order_by()
            .map_err(|e| invalid("orderBy()", e))?;

        Ok(self.with_modifiers(modifiers))
    }

    /// Order results by `field_path` with a direction string
    ///
    /// `direction` is `asc` or `desc` (any case); `None` means ascending.
    pub fn order_by_str(
        &self,
        field_path: impl Into<FieldPathArg>,
        direction: Option<&str>,
    ) -> Result<Query, FirebaseError> {
        let direction = match direction {
            None => Direction::Ascending,
            Some(s) => s.parse().map_err(|_| {
                invalid(
                    "orderBy(_, *)",
                    "'directionStr' must be one of 'asc' or 'desc'.",
                )
            })?,
        };
        self.order_by(field_path, direction)
    }

    /// Return at most `limit` documents
    pub fn limit(&self, limit: i64) -> Result<Query, FirebaseError> {
        let limit = u64::try_from(limit)
            .ok()
            .filter(|l| *l > 0)
            .ok_or_else(|| invalid("limit(*)", "'limit' must be a positive integer value."))?;
        Ok(self.with_modifiers(self.modifiers.with_limit(limit)))
    }

    fn cursor(&self, kind: CursorKind, anchor: CursorAnchor) -> Result<Query, FirebaseError> {
        let modifiers = cursor::resolve(&self.modifiers, kind, anchor)
            .map_err(|e| invalid(&format!("{}(*)", kind.method_name()), e))?;
        Ok(self.with_modifiers(modifiers))
    }

    /// Start at the given document or field values (inclusive)
    pub fn start_at(&self, anchor: impl Into<CursorAnchor>) -> Result<Query, FirebaseError> {
        self.cursor(CursorKind::StartAt, anchor.into())
    }

    /// Start after the given document or field values (exclusive)
    pub fn start_after(&self, anchor: impl Into<CursorAnchor>) -> Result<Query, FirebaseError> {
        self.cursor(CursorKind::StartAfter, anchor.into())
    }

    /// End at the given document or field values (inclusive)
    pub fn end_at(&self, anchor: impl Into<CursorAnchor>) -> Result<Query, FirebaseError> {
        self.cursor(CursorKind::EndAt, anchor.into())
    }

    /// End before the given document or field values (exclusive)
    pub fn end_before(&self, anchor: impl Into<CursorAnchor>) -> Result<Query, FirebaseError> {
        self.cursor(CursorKind::EndBefore, anchor.into())
    }

    /// Whether `other` describes the same query
    ///
    /// Cheap checks (app, path, type, clause counts) run before the deep
    /// comparison of filters, orders and options.
    pub fn is_equal(&self, other: &Query) -> bool {
        let (a, b) = (&self.modifiers, &other.modifiers);
        if self.firestore.app().name() != other.firestore.app().name()
            || self.path != other.path
            || a.query_type() != b.query_type()
            || a.filters().len() != b.filters().len()
            || a.orders().len() != b.orders().len()
            || a.options().len() != b.options().len()
        {
            return false;
        }

        a.filters() == b.filters() && a.orders() == b.orders() && a.options() == b.options()
    }

    /// Parameters forwarded to the native binding
    pub fn to_native(&self) -> NativeQuery {
        NativeQuery {
            path: self.path.clone(),
            query_type: self.modifiers.query_type(),
            filters: self.modifiers.filters().to_vec(),
            orders: self.modifiers.orders().to_vec(),
            options: self.modifiers.options().clone(),
        }
    }

    /// Execute the query once
    ///
    /// `None` reads with [`Source::Default`].
    pub async fn get(&self, options: Option<GetOptions>) -> Result<QuerySnapshot, FirebaseError> {
        let options = options.unwrap_or_default();
        tracing::debug!(path = %self.path, source = ?options.source, "collection get");

        let raw = self
            .firestore
            .native()
            .collection_get(&self.to_native(), &options)
            .await
            .map_err(|payload| NativeFirebaseError::from_event(&payload, "firestore"))?;

        Ok(QuerySnapshot::new(self.clone(), raw))
    }

    /// Execute the query once, naming the source as a string
    ///
    /// `source` is one of `default`, `server` or `cache`.
    pub async fn get_from(&self, source: &str) -> Result<QuerySnapshot, FirebaseError> {
        let source: Source = source.parse().map_err(|e| invalid("get(*)", e))?;
        self.get(Some(source.into())).await
    }

    /// Listen for result changes with callbacks
    ///
    /// The registration is created synchronously; events arrive as the
    /// native binding emits them. Each event calls the combined callback
    /// first, then the success-only or error-only callback.
    ///
    /// # Example
    /// ```no_run
    /// # use firebase_bridge_sdk::firestore::{Firestore, SnapshotArgs};
    /// # fn example(firestore: Firestore) -> Result<(), firebase_bridge_sdk::FirebaseError> {
    /// let registration = firestore.collection("cities")?.query().on_snapshot(
    ///     SnapshotArgs::next_error(
    ///         |snapshot| println!("{} cities", snapshot.len()),
    ///         |error| eprintln!("listen failed: {}", error),
    ///     ),
    /// )?;
    /// // later
    /// registration.remove();
    /// # Ok(())
    /// # }
    /// ```
    pub fn on_snapshot(&self, args: SnapshotArgs) -> Result<ListenerRegistration, FirebaseError> {
        let parsed = args.parse().map_err(|e| invalid("onSnapshot(*)", e))?;
        Ok(listener::subscribe(self, parsed))
    }

    /// Listen for result changes as a stream
    ///
    /// The listener is removed when the stream is dropped.
    pub fn listen(
        &self,
        options: impl Into<SnapshotListenOptions>,
    ) -> Result<QuerySnapshotStream, FirebaseError> {
        let (tx, rx) = mpsc::unbounded_channel::<Result<QuerySnapshot, FirebaseError>>();
        let error_tx = tx.clone();

        let registration = self.on_snapshot(SnapshotArgs::with_options(
            options,
            SnapshotArgs::next_error(
                move |snapshot| {
                    let _ = tx.send(Ok(snapshot.clone()));
                },
                move |error| {
                    let _ = error_tx.send(Err(FirebaseError::from(error.clone())));
                },
            ),
        ))?;

        Ok(QuerySnapshotStream::new(rx, registration))
    }
}

impl PartialEq for Query {
    fn eq(&self, other: &Self) -> bool {
        self.is_equal(other)
    }
}

impl std::fmt::Debug for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Query")
            .field("app", &self.firestore.app().name())
            .field("path", &self.path)
            .field("modifiers", &self.modifiers)
            .finish()
    }
}
