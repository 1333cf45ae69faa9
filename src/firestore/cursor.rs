//! Cursor resolution for `startAt` / `startAfter` / `endAt` / `endBefore`
//!
//! A cursor anchor is either a document snapshot from an earlier result or
//! an explicit list of field values. Either way it is turned into a list of
//! values lined up with the query's orderings.

use super::document_snapshot::DocumentSnapshot;
use super::field_value::Value;
use super::modifiers::{CursorKind, Modifiers};

/// Pagination anchor accepted by the cursor methods of `Query`
#[derive(Debug, Clone, PartialEq)]
pub enum CursorAnchor {
    /// Position relative to a previously read document
    Snapshot(DocumentSnapshot),
    /// Explicit values, one per `orderBy` clause (prefix allowed)
    Values(Vec<Value>),
}

/// First positional cursor argument: a snapshot or a field value
#[derive(Debug, Clone, PartialEq)]
pub enum CursorArg {
    /// Document snapshot
    Snapshot(DocumentSnapshot),
    /// First field value
    Value(Value),
}

impl CursorAnchor {
    /// Build an anchor from positional arguments: a snapshot or a first
    /// field value, followed by further field values
    ///
    /// A snapshot cannot be combined with further values.
    pub fn from_parts(first: impl Into<CursorArg>, rest: Vec<Value>) -> Result<Self, String> {
        match first.into() {
            CursorArg::Snapshot(snapshot) => {
                if !rest.is_empty() {
                    return Err(
                        "Too many arguments provided. Expected DocumentSnapshot or list of field values."
                            .to_string(),
                    );
                }
                Ok(CursorAnchor::Snapshot(snapshot))
            }
            CursorArg::Value(value) => {
                let mut values = Vec::with_capacity(rest.len() + 1);
                values.push(value);
                values.extend(rest);
                Ok(CursorAnchor::Values(values))
            }
        }
    }
}

impl From<DocumentSnapshot> for CursorAnchor {
    fn from(snapshot: DocumentSnapshot) -> Self {
        CursorAnchor::Snapshot(snapshot)
    }
}

impl From<&DocumentSnapshot> for CursorAnchor {
    fn from(snapshot: &DocumentSnapshot) -> Self {
        CursorAnchor::Snapshot(snapshot.clone())
    }
}

impl From<Vec<Value>> for CursorAnchor {
    fn from(values: Vec<Value>) -> Self {
        CursorAnchor::Values(values)
    }
}

impl From<Value> for CursorAnchor {
    fn from(value: Value) -> Self {
        CursorAnchor::Values(vec![value])
    }
}

impl From<DocumentSnapshot> for CursorArg {
    fn from(snapshot: DocumentSnapshot) -> Self {
        CursorArg::Snapshot(snapshot)
    }
}

impl From<Value> for CursorArg {
    fn from(value: Value) -> Self {
        CursorArg::Value(value)
    }
}

/// Resolve `anchor` against `modifiers` and attach it as a `kind` cursor
///
/// Returns new modifiers; `modifiers` itself is left untouched.
pub fn resolve(
    modifiers: &Modifiers,
    kind: CursorKind,
    anchor: CursorAnchor,
) -> Result<Modifiers, String> {
    match anchor {
        CursorAnchor::Snapshot(snapshot) => resolve_snapshot(modifiers, kind, &snapshot),
        CursorAnchor::Values(values) => {
            if values.is_empty() {
                return Err(
                    "Expected a DocumentSnapshot or list of field values but got an empty list."
                        .to_string(),
                );
            }
            if values.len() > modifiers.orders().len() {
                return Err(
                    "Too many arguments provided. The number of arguments must be less than or equal to the number of orderBy() clauses."
                        .to_string(),
                );
            }
            Ok(modifiers.with_cursor(kind, values))
        }
    }
}

fn resolve_snapshot(
    modifiers: &Modifiers,
    kind: CursorKind,
    snapshot: &DocumentSnapshot,
) -> Result<Modifiers, String> {
    if !snapshot.exists() {
        return Err("Can't use a DocumentSnapshot that doesn't exist.".to_string());
    }

    let mut values = Vec::with_capacity(modifiers.orders().len() + 1);
    for order in modifiers.orders() {
        if order.field_path.is_document_id() {
            values.push(Value::String(snapshot.id().to_string()));
            continue;
        }
        let Some(value) = snapshot.get_path(&order.field_path) else {
            return Err(format!(
                "You are trying to start or end a query using a document for which the field '{}' (used as the orderBy) does not exist.",
                order.field_path
            ));
        };
        values.push(value.clone());
    }

    let with_id_order = if modifiers.has_document_id_order() {
        modifiers.clone()
    } else {
        values.push(Value::String(snapshot.id().to_string()));
        modifiers.with_document_id_order()
    };

    Ok(with_id_order.with_cursor(kind, values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::firestore::field_path::FieldPath;
    use crate::firestore::field_value::MapValue;
    use crate::firestore::modifiers::Direction;

    fn ordered(fields: &[&str]) -> Modifiers {
        fields.iter().fold(Modifiers::default(), |m, f| {
            m.with_order(FieldPath::from_dot_separated(f).unwrap(), Direction::Ascending)
        })
    }

    fn doc() -> DocumentSnapshot {
        let mut data = MapValue::new();
        data.insert("age".to_string(), 30.into());
        data.insert("name".to_string(), "Alice".into());
        DocumentSnapshot::new("users/alice", data)
    }

    #[test]
    fn test_values_within_order_count() {
        let m = ordered(&["age", "name"]);
        let next = resolve(&m, CursorKind::StartAt, vec![Value::from(30)].into()).unwrap();
        assert_eq!(next.options().start_at, Some(vec![Value::from(30)]));
        assert!(m.options().start_at.is_none());
    }

    #[test]
    fn test_too_many_values() {
        let m = ordered(&["age"]);
        let err = resolve(&m, CursorKind::EndAt, vec![1.into(), 2.into()].into()).unwrap_err();
        assert!(err.contains("less than or equal to the number of orderBy()"));
    }

    #[test]
    fn test_empty_values_rejected() {
        let m = ordered(&["age"]);
        assert!(resolve(&m, CursorKind::EndAt, Vec::<Value>::new().into()).is_err());
    }

    #[test]
    fn test_snapshot_appends_document_id() {
        let m = ordered(&["age"]);
        let next = resolve(&m, CursorKind::StartAfter, doc().into()).unwrap();

        assert_eq!(
            next.options().start_after,
            Some(vec![Value::from(30), Value::from("alice")])
        );
        assert_eq!(next.orders().len(), 2);
        assert!(next.orders()[1].field_path.is_document_id());
        assert_eq!(m.orders().len(), 1);
    }

    #[test]
    fn test_snapshot_with_existing_document_id_order() {
        let m = ordered(&["age"]).with_document_id_order();
        let next = resolve(&m, CursorKind::EndBefore, doc().into()).unwrap();
        assert_eq!(next.orders().len(), 2);
        assert_eq!(
            next.options().end_before,
            Some(vec![Value::from(30), Value::from("alice")])
        );
    }

    #[test]
    fn test_snapshot_missing_field() {
        let m = ordered(&["height"]);
        let err = resolve(&m, CursorKind::StartAt, doc().into()).unwrap_err();
        assert!(err.contains("'height'"));
    }

    #[test]
    fn test_snapshot_must_exist() {
        let m = ordered(&["age"]);
        let err = resolve(&m, CursorKind::StartAt, DocumentSnapshot::missing("users/x").into())
            .unwrap_err();
        assert!(err.contains("doesn't exist"));
    }

    #[test]
    fn test_from_parts() {
        assert!(CursorAnchor::from_parts(doc(), vec![1.into()]).is_err());
        assert_eq!(
            CursorAnchor::from_parts(Value::from(1), vec![2.into()]).unwrap(),
            CursorAnchor::Values(vec![1.into(), 2.into()])
        );
        assert!(matches!(
            CursorAnchor::from_parts(doc(), vec![]).unwrap(),
            CursorAnchor::Snapshot(_)
        ));
    }
}
