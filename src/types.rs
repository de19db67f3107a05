//! Core types for the resource cache.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A location in the state tree: an ordered sequence of string segments.
///
/// Every segment is a map key; there is no array indexing at the tree
/// level. Paths are cheap to extend and compare by prefix, which is what
/// the subscription layer uses to scope notifications.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Path(Vec<String>);

impl Path {
    /// Create an empty path (the tree root).
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Create a path from existing segments.
    pub fn from_segments(segments: Vec<String>) -> Self {
        Self(segments)
    }

    /// Append a segment and return self (builder pattern).
    pub fn key(mut self, segment: impl Into<String>) -> Self {
        self.0.push(segment.into());
        self
    }

    /// Push a segment onto the path (mutating).
    pub fn push(&mut self, segment: impl Into<String>) {
        self.0.push(segment.into());
    }

    /// Return a new path with `other`'s segments appended.
    pub fn join(&self, other: &Path) -> Path {
        let mut joined = self.clone();
        joined.0.extend(other.0.iter().cloned());
        joined
    }

    /// The segments of this path.
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if `self` is a (non-strict) prefix of `other`.
    pub fn is_prefix_of(&self, other: &Path) -> bool {
        other.0.starts_with(&self.0)
    }

    /// True if one path is a prefix of the other.
    ///
    /// A write at a path concerns subscribers of that path, of any
    /// ancestor, and of any descendant. `overlaps` is that relation.
    pub fn overlaps(&self, other: &Path) -> bool {
        self.is_prefix_of(other) || other.is_prefix_of(self)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "$")?;
        for segment in &self.0 {
            write!(f, ".{}", segment)?;
        }
        Ok(())
    }
}

impl FromIterator<String> for Path {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Path(iter.into_iter().collect())
    }
}

/// A model's identifier, used verbatim as its key in the `models` mapping.
///
/// Identifiers arrive as JSON strings or integers; both are kept as their
/// string form (`42` becomes `"42"`), matching how they are stored in
/// collection lists.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelId(String);

impl ModelId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ModelId({})", self.0)
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ModelId {
    fn from(s: String) -> Self {
        ModelId(s)
    }
}

impl From<&str> for ModelId {
    fn from(s: &str) -> Self {
        ModelId(s.to_string())
    }
}

impl From<u64> for ModelId {
    fn from(n: u64) -> Self {
        ModelId(n.to_string())
    }
}

impl From<i64> for ModelId {
    fn from(n: i64) -> Self {
        ModelId(n.to_string())
    }
}

/// How a request's `data` field is interpreted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestFormat {
    /// An ordered list of model identifiers, hydrated on read.
    Models,
    /// An ordered list of raw scalar values, returned verbatim.
    #[serde(rename = "string")]
    Scalar,
}

impl RequestFormat {
    /// The tag stored under the request's `format` field.
    pub fn as_str(self) -> &'static str {
        match self {
            RequestFormat::Models => "models",
            RequestFormat::Scalar => "string",
        }
    }

    /// Parse a stored `format` value. Anything but `"string"` is the
    /// default interpretation.
    pub fn from_value(value: Option<&Value>) -> RequestFormat {
        match value.and_then(Value::as_str) {
            Some("string") => RequestFormat::Scalar,
            _ => RequestFormat::Models,
        }
    }
}

impl Default for RequestFormat {
    fn default() -> Self {
        RequestFormat::Models
    }
}

/// One compensating step in an undo log.
///
/// Logs are tagged values rather than closures so they can be inspected,
/// serialized, and replayed with [`apply_undo`]. A log is valid until the
/// next structural change to the paths it touches.
///
/// [`apply_undo`]: crate::store::ResourceStore::apply_undo
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum UndoAction {
    /// Put a model back under its identifier.
    RestoreModel { id: ModelId, value: Value },

    /// Re-insert an identifier at its pre-removal index in a request's
    /// `data` list. The index is clamped to the list's current length.
    ReinsertInCollection {
        path: String,
        index: usize,
        id: ModelId,
    },
}
