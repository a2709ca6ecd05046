//! Field path extraction from JSON documents of unknown shape.
//!
//! The walker descends depth-first through objects only. Each key yields a
//! path; an object value yields its own path and, while the depth budget
//! lasts, the paths of its children. Arrays and scalars are leaves.
//!
//! Depth counts nesting below the document root: top-level keys sit at
//! depth 0, so a `max_depth` of 2 admits `a`, `a.b` and `a.b.c` but never
//! `a.b.c.d`.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::{Map, Value};

use ecs_model::{FieldPath, FieldSample};

/// Default maximum nesting depth.
pub const DEFAULT_MAX_DEPTH: usize = 2;

/// Paths found in one pass, each with the first sample seen for it.
pub type FieldSamples = BTreeMap<FieldPath, FieldSample>;

/// How the walker treats one JSON value.
enum Node<'a> {
    Object(&'a Map<String, Value>),
    Leaf,
}

impl<'a> From<&'a Value> for Node<'a> {
    fn from(value: &'a Value) -> Self {
        match value {
            Value::Object(object) => Self::Object(object),
            Value::Null
            | Value::Bool(_)
            | Value::Number(_)
            | Value::String(_)
            | Value::Array(_) => Self::Leaf,
        }
    }
}

/// Depth-bounded field path extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathExtractor {
    max_depth: usize,
}

impl Default for PathExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

impl PathExtractor {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Extract paths and samples from an object, or from every object
    /// element of an array. Any other value yields nothing.
    pub fn extract_fields(&self, value: &Value) -> FieldSamples {
        let mut fields = FieldSamples::new();
        match value {
            Value::Object(document) => self.walk(document, None, 0, &mut fields),
            Value::Array(items) => {
                for item in items {
                    if let Value::Object(document) = item {
                        self.walk(document, None, 0, &mut fields);
                    }
                }
            }
            _ => {}
        }
        fields
    }

    /// Extract paths and samples from a single document.
    pub fn extract_document(&self, document: &Map<String, Value>) -> FieldSamples {
        let mut fields = FieldSamples::new();
        self.walk(document, None, 0, &mut fields);
        fields
    }

    /// Extract the set of paths only.
    pub fn extract_paths(&self, value: &Value) -> BTreeSet<FieldPath> {
        self.extract_fields(value).into_keys().collect()
    }

    fn walk(
        &self,
        object: &Map<String, Value>,
        prefix: Option<&FieldPath>,
        depth: usize,
        fields: &mut FieldSamples,
    ) {
        for (key, value) in object {
            let path = match prefix {
                Some(parent) => parent.child(key),
                None => FieldPath::root(key),
            };
            fields
                .entry(path.clone())
                .or_insert_with(|| FieldSample::from(value));

            if let Node::Object(child) = Node::from(value)
                && depth < self.max_depth
            {
                self.walk(child, Some(&path), depth + 1, fields);
            }
        }
    }
}

/// Extract the field paths of `value` up to `max_depth`.
pub fn extract_paths(value: &Value, max_depth: usize) -> BTreeSet<FieldPath> {
    PathExtractor::new(max_depth).extract_paths(value)
}
