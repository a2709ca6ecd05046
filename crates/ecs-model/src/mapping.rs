//! Persisted mapping records owned by the backend store.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Default number of rows requested per page.
pub const DEFAULT_PAGE_SIZE: u32 = 25;

/// Backend identifier of a mapping row; numeric or textual.
///
/// Text in canonical integer form is held as [`MappingId::Int`], so `"42"`
/// and `42` name the same row whichever way the backend encodes it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged, from = "WireId")]
pub enum MappingId {
    Int(i64),
    Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireId {
    Int(i64),
    Text(String),
}

impl From<WireId> for MappingId {
    fn from(value: WireId) -> Self {
        match value {
            WireId::Int(id) => Self::Int(id),
            WireId::Text(text) => Self::from(text.as_str()),
        }
    }
}

impl fmt::Display for MappingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(id) => write!(f, "{id}"),
            Self::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for MappingId {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for MappingId {
    fn from(value: &str) -> Self {
        match value.parse::<i64>() {
            Ok(id) if id.to_string() == value => Self::Int(id),
            _ => Self::Text(value.to_string()),
        }
    }
}

/// A persisted source-field to ECS-field mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingRow {
    pub id: MappingId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sourcetype: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub source_field: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub mapped_field_name: String,
    #[serde(default)]
    pub mapping_type: Option<String>,
    #[serde(default)]
    pub rationale: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub created_at: Option<String>,
    /// Client-side verification overlay.
    #[serde(default, deserialize_with = "null_as_default")]
    pub human_verified: bool,
}

impl MappingRow {
    /// Mapped name with `.` separators replaced by `_`.
    pub fn mapped_field_name_underscore(&self) -> String {
        self.mapped_field_name.replace('.', "_")
    }

    /// Apply a saved patch to this row.
    pub fn apply(&mut self, patch: &MappingPatch) {
        self.human_verified = patch.human_verified;
        self.mapped_field_name.clone_from(&patch.mapped_field_name);
    }
}

/// Partial update sent for one row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingPatch {
    pub human_verified: bool,
    pub mapped_field_name: String,
}

/// One page of mapping rows as returned by the list endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MappingPage {
    #[serde(default, deserialize_with = "null_as_default")]
    pub items: Vec<MappingRow>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total: u64,
}

/// Parameters of one list request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub search: String,
    /// 1-based page number.
    pub page: u32,
    pub page_size: u32,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            search: String::new(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
