//! Firestore FieldPath type
//!
//! A field path is an ordered list of segments. It can be built from a dot
//! separated string (`"address.city"`) or from explicit segments, which is
//! the only way to address a field whose name itself contains a dot.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Segment used by the special document id path
pub const DOCUMENT_ID_SEGMENT: &str = "__name__";

const RESERVED_CHARACTERS: &[char] = &['~', '*', '/', '[', ']'];

/// Path to a field inside a document
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    /// Build a path from explicit segments
    ///
    /// Every segment must be non-empty and at least one segment is required.
    pub fn new<I, S>(segments: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() {
            return Err("Invalid field path. Provided names must not be empty".to_string());
        }
        if let Some(index) = segments.iter().position(String::is_empty) {
            return Err(format!(
                "Invalid field name at index {}. Field names must not be empty",
                index
            ));
        }
        Ok(Self { segments })
    }

    /// Parse a dot separated path such as `"address.city"`
    pub fn from_dot_separated(path: &str) -> Result<Self, String> {
        if let Some(bad) = path.chars().find(|c| RESERVED_CHARACTERS.contains(c)) {
            return Err(format!(
                "Invalid field path ({}). Paths must not contain '{}'",
                path, bad
            ));
        }

        let segments: Vec<&str> = path.split('.').collect();
        if path.is_empty() || segments.iter().any(|s| s.is_empty()) {
            return Err(format!(
                "Invalid field path ({}). Paths must not be empty, begin with '.', end with '.', or contain '..'",
                path
            ));
        }

        Ok(Self {
            segments: segments.into_iter().map(str::to_string).collect(),
        })
    }

    /// The special path referring to a document's id
    pub fn document_id() -> Self {
        Self {
            segments: vec![DOCUMENT_ID_SEGMENT.to_string()],
        }
    }

    /// Whether this is [`FieldPath::document_id`]
    pub fn is_document_id(&self) -> bool {
        self.segments.len() == 1 && self.segments[0] == DOCUMENT_ID_SEGMENT
    }

    /// Path segments
    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

/// A field path argument as accepted by the query builder
///
/// Strings are parsed lazily so the builder can report parse errors with
/// its own call-signature prefix.
#[derive(Debug, Clone)]
pub enum FieldPathArg {
    /// Dot separated string, not yet validated
    Dotted(String),
    /// Already built path
    Path(FieldPath),
}

impl FieldPathArg {
    pub(crate) fn resolve(self) -> Result<FieldPath, String> {
        match self {
            FieldPathArg::Dotted(s) => FieldPath::from_dot_separated(&s),
            FieldPathArg::Path(p) => Ok(p),
        }
    }
}

impl From<&str> for FieldPathArg {
    fn from(value: &str) -> Self {
        FieldPathArg::Dotted(value.to_string())
    }
}

impl From<String> for FieldPathArg {
    fn from(value: String) -> Self {
        FieldPathArg::Dotted(value)
    }
}

impl From<FieldPath> for FieldPathArg {
    fn from(value: FieldPath) -> Self {
        FieldPathArg::Path(value)
    }
}

impl From<&FieldPath> for FieldPathArg {
    fn from(value: &FieldPath) -> Self {
        FieldPathArg::Path(value.clone())
    }
}
