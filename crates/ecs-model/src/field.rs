//! Field paths and the samples found at them.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Dot-joined key sequence locating a value inside a JSON document.
///
/// Paths compare and deduplicate by their joined form, so `{"a.b": 1}` and
/// `{"a": {"b": 1}}` both yield the single path `a.b`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldPath(String);

impl FieldPath {
    /// Path of a top-level key.
    pub fn root(key: &str) -> Self {
        Self(key.to_string())
    }

    /// Path of `key` nested below this path.
    #[must_use]
    pub fn child(&self, key: &str) -> Self {
        Self(format!("{}.{key}", self.0))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Nesting depth of the joined path: the number of `.` separators.
    ///
    /// A top-level key has depth 0.
    pub fn depth(&self) -> usize {
        self.0.matches('.').count()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FieldPath {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for FieldPath {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for FieldPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for FieldPath {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// The value found at a field path inside one document.
///
/// An absent value is represented by the path being missing from the
/// sample map, not by a variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldSample {
    /// A string, number, or boolean rendered as text.
    Scalar(String),
    /// An object or array.
    Container,
    /// JSON `null`.
    Null,
}

impl FieldSample {
    /// Literal text of a scalar sample.
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Self::Scalar(text) => Some(text),
            Self::Container | Self::Null => None,
        }
    }
}

impl From<&Value> for FieldSample {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(flag) => Self::Scalar(flag.to_string()),
            Value::Number(number) => Self::Scalar(number.to_string()),
            Value::String(text) => Self::Scalar(text.clone()),
            Value::Array(_) | Value::Object(_) => Self::Container,
        }
    }
}
