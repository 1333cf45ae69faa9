//! Immutable query modifiers
//!
//! `Modifiers` accumulates the constraints of a query. Every `with_*`
//! method returns a new value; nothing is changed in place, so a `Query`
//! can hand its modifiers to any number of derived queries.

use super::field_path::FieldPath;
use super::field_value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Whether the query targets a single collection or every collection with
/// the same id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QueryType {
    /// A single collection
    #[default]
    Collection,
    /// All collections sharing an id
    CollectionGroup,
}

/// Filter operator accepted by `where`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operator {
    /// `==`
    Equal,
    /// `>`
    GreaterThan,
    /// `>=`
    GreaterThanOrEqual,
    /// `<`
    LessThan,
    /// `<=`
    LessThanOrEqual,
    /// `array-contains`
    ArrayContains,
}

impl Operator {
    /// Operator as written by callers, e.g. `>=`
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Equal => "==",
            Operator::GreaterThan => ">",
            Operator::GreaterThanOrEqual => ">=",
            Operator::LessThan => "<",
            Operator::LessThanOrEqual => "<=",
            Operator::ArrayContains => "array-contains",
        }
    }

    /// `<`, `<=`, `>` or `>=`
    pub fn is_inequality(&self) -> bool {
        matches!(
            self,
            Operator::GreaterThan
                | Operator::GreaterThanOrEqual
                | Operator::LessThan
                | Operator::LessThanOrEqual
        )
    }
}

impl FromStr for Operator {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "==" => Ok(Operator::Equal),
            ">" => Ok(Operator::GreaterThan),
            ">=" => Ok(Operator::GreaterThanOrEqual),
            "<" => Ok(Operator::LessThan),
            "<=" => Ok(Operator::LessThanOrEqual),
            "array-contains" => Ok(Operator::ArrayContains),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort direction for query ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    /// Ascending (default)
    #[default]
    Ascending,
    /// Descending
    Descending,
}

impl FromStr for Direction {
    type Err = ();

    /// Accepts `asc` / `desc` in any case
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(Direction::Ascending),
            "desc" => Ok(Direction::Descending),
            _ => Err(()),
        }
    }
}

/// A single `where` clause
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    /// Field the filter applies to
    pub field_path: FieldPath,
    /// Comparison operator
    pub operator: Operator,
    /// Operand
    pub value: Value,
}

/// A single `orderBy` clause
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Field to sort by
    pub field_path: FieldPath,
    /// Sort direction
    pub direction: Direction,
}

/// Which cursor a set of values is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorKind {
    /// Include documents starting at the cursor
    StartAt,
    /// Include documents strictly after the cursor
    StartAfter,
    /// Include documents up to and including the cursor
    EndAt,
    /// Include documents strictly before the cursor
    EndBefore,
}

impl CursorKind {
    /// Builder method name, used in error messages
    pub fn method_name(&self) -> &'static str {
        match self {
            CursorKind::StartAt => "startAt",
            CursorKind::StartAfter => "startAfter",
            CursorKind::EndAt => "endAt",
            CursorKind::EndBefore => "endBefore",
        }
    }

    /// Whether this cursor bounds the start of the result set
    pub fn is_start(&self) -> bool {
        matches!(self, CursorKind::StartAt | CursorKind::StartAfter)
    }
}

/// Limit and cursor options
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryOptions {
    /// Maximum number of documents
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    /// `startAt` cursor values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_at: Option<Vec<Value>>,
    /// `startAfter` cursor values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_after: Option<Vec<Value>>,
    /// `endAt` cursor values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_at: Option<Vec<Value>>,
    /// `endBefore` cursor values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_before: Option<Vec<Value>>,
}

impl QueryOptions {
    /// Number of options that are set
    pub fn len(&self) -> usize {
        usize::from(self.limit.is_some())
            + usize::from(self.start_at.is_some())
            + usize::from(self.start_after.is_some())
            + usize::from(self.end_at.is_some())
            + usize::from(self.end_before.is_some())
    }

    /// Whether no option is set
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Values of the given cursor, if set
    pub fn cursor(&self, kind: CursorKind) -> Option<&[Value]> {
        match kind {
            CursorKind::StartAt => self.start_at.as_deref(),
            CursorKind::StartAfter => self.start_after.as_deref(),
            CursorKind::EndAt => self.end_at.as_deref(),
            CursorKind::EndBefore => self.end_before.as_deref(),
        }
    }
}

/// Immutable bundle of query constraints
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Modifiers {
    #[serde(rename = "type")]
    query_type: QueryType,
    filters: Vec<Filter>,
    orders: Vec<Order>,
    options: QueryOptions,
}

impl Modifiers {
    /// Empty modifiers for the given query type
    pub fn new(query_type: QueryType) -> Self {
        Self {
            query_type,
            ..Default::default()
        }
    }

    /// Collection or collection group
    pub fn query_type(&self) -> QueryType {
        self.query_type
    }

    /// `where` clauses in call order
    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    /// `orderBy` clauses in call order
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    /// Limit and cursors
    pub fn options(&self) -> &QueryOptions {
        &self.options
    }

    /// Whether `startAt` or `startAfter` has been set
    pub fn has_start(&self) -> bool {
        self.options.start_at.is_some() || self.options.start_after.is_some()
    }

    /// Whether `endAt` or `endBefore` has been set
    pub fn has_end(&self) -> bool {
        self.options.end_at.is_some() || self.options.end_before.is_some()
    }

    /// Whether an ordering by document id is present
    pub fn has_document_id_order(&self) -> bool {
        self.orders.iter().any(|o| o.field_path.is_document_id())
    }

    /// Append a filter
    pub fn with_filter(&self, field_path: FieldPath, operator: Operator, value: Value) -> Self {
        let mut next = self.clone();
        next.filters.push(Filter {
            field_path,
            operator,
            value,
        });
        next
    }

    /// Append an ordering
    pub fn with_order(&self, field_path: FieldPath, direction: Direction) -> Self {
        let mut next = self.clone();
        next.orders.push(Order {
            field_path,
            direction,
        });
        next
    }

    /// Append an ascending ordering by document id unless one exists
    pub fn with_document_id_order(&self) -> Self {
        if self.has_document_id_order() {
            return self.clone();
        }
        self.with_order(FieldPath::document_id(), Direction::Ascending)
    }

    /// Set the limit
    pub fn with_limit(&self, limit: u64) -> Self {
        let mut next = self.clone();
        next.options.limit = Some(limit);
        next
    }

    /// Attach cursor values
    ///
    /// A start cursor replaces any previous start cursor, an end cursor any
    /// previous end cursor.
    pub fn with_cursor(&self, kind: CursorKind, values: Vec<Value>) -> Self {
        let mut next = self.clone();
        let options = &mut next.options;
        if kind.is_start() {
            options.start_at = None;
            options.start_after = None;
        } else {
            options.end_at = None;
            options.end_before = None;
        }
        match kind {
            CursorKind::StartAt => options.start_at = Some(values),
            CursorKind::StartAfter => options.start_after = Some(values),
            CursorKind::EndAt => options.end_at = Some(values),
            CursorKind::EndBefore => options.end_before = Some(values),
        }
        next
    }

    fn inequality_field(&self) -> Option<&FieldPath> {
        self.filters
            .iter()
            .find(|f| f.operator.is_inequality())
            .map(|f| &f.field_path)
    }

    fn check_first_order(&self) -> Result<(), String> {
        let (Some(field), Some(first)) = (self.inequality_field(), self.orders.first()) else {
            return Ok(());
        };
        if &first.field_path != field {
            return Err(format!(
                "Invalid query. You have a where filter with an inequality (<, <=, >, or >=) on field '{}' and so you must also use '{}' as your first orderBy(), but your first orderBy() is currently on field '{}' instead.",
                field, field, first.field_path
            ));
        }
        Ok(())
    }

    /// Check the filter set for combinations Firestore rejects
    pub fn validate_where(&self) -> Result<(), String> {
        if let Some(field) = self.inequality_field() {
            if let Some(other) = self
                .filters
                .iter()
                .filter(|f| f.operator.is_inequality())
                .map(|f| &f.field_path)
                .find(|p| *p != field)
            {
                return Err(format!(
                    "Invalid query. All where filters with an inequality (<, <=, >, or >=) must be on the same field. But you have inequality filters on '{}' and '{}'.",
                    field, other
                ));
            }
        }

        let array_contains = self
            .filters
            .iter()
            .filter(|f| f.operator == Operator::ArrayContains)
            .count();
        if array_contains > 1 {
            return Err("Invalid query. Queries only support a single array-contains filter.".to_string());
        }

        self.check_first_order()
    }

    /// Check the ordering set for combinations Firestore rejects
    pub fn validate_order_by(&self) -> Result<(), String> {
        for (i, order) in self.orders.iter().enumerate() {
            if self.orders[..i].iter().any(|o| o.field_path == order.field_path) {
                return Err(format!(
                    "Invalid query. Order by clause cannot contain duplicate fields ('{}').",
                    order.field_path
                ));
            }
            if self
                .filters
                .iter()
                .any(|f| f.operator == Operator::Equal && f.field_path == order.field_path)
            {
                return Err(format!(
                    "Invalid query. You cannot order by field '{}' because it has an equality filter.",
                    order.field_path
                ));
            }
        }

        self.check_first_order()
    }
}
