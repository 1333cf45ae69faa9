//! Firestore field value types
//!
//! `Value` is the data model exchanged with the native binding: filter
//! operands, cursor components and document fields all use it.

use super::field_path::FieldPath;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Map of field values, ordered by key
pub type MapValue = BTreeMap<String, Value>;

/// Firestore value
///
/// Serialized as `{"type": ..., "value": ...}` for the native boundary.
/// Equality treats every NaN as equal to every other NaN, so queries built
/// with a NaN operand still compare equal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum Value {
    /// `null`
    Null,
    /// Boolean
    Boolean(bool),
    /// 64-bit integer
    Integer(i64),
    /// Double
    Double(f64),
    /// UTF-8 string
    String(String),
    /// Document reference, as a full document path
    Reference(String),
    /// Array of values
    Array(Vec<Value>),
    /// Nested map
    Map(MapValue),
}

impl Value {
    /// Whether this is [`Value::Null`]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// String content, if this is a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Nested map, if this is a map
    pub fn as_map(&self) -> Option<&MapValue> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Reference(a), Value::Reference(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            _ => false,
        }
    }
}

/// Resolve `path` inside `fields`, descending into nested maps
pub(crate) fn lookup<'a>(fields: &'a MapValue, path: &FieldPath) -> Option<&'a Value> {
    let (first, rest) = path.segments().split_first()?;
    let mut current = fields.get(first)?;
    for segment in rest {
        current = current.as_map()?.get(segment)?;
    }
    Some(current)
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v.into())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Array(v)
    }
}

impl From<MapValue> for Value {
    fn from(v: MapValue) -> Self {
        Value::Map(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}
