//! Batch mapping request and response types.
//!
//! A batch is one submitted set of field-mapping queries. The request side
//! is a list of [`BatchInputItem`]; the response side is a list of
//! [`MapBatchResultItem`], one classifier decision per submitted field.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::field::FieldPath;
use crate::mapping::null_as_default;

/// Default source type attached to every batch item.
pub const DEFAULT_SOURCETYPE: &str = "generic";

/// Default classifier model name.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default number of retrieval candidates the classifier considers.
pub const DEFAULT_LIMIT: u32 = 5;

/// Settings shared by every item of one batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Log source type (e.g. `"nginx:access"`).
    pub sourcetype: String,
    /// Classifier model requested from the backend.
    pub model: String,
    /// Number of retrieval candidates per field.
    pub limit: u32,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            sourcetype: DEFAULT_SOURCETYPE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            limit: DEFAULT_LIMIT,
        }
    }
}

/// One field submitted for mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchInputItem {
    pub sourcetype: String,
    pub field: FieldPath,
    /// Sample value from the first document, or `field {path}`.
    pub description: String,
}

/// The query a result item answers, echoed back by the backend.
///
/// Missing or `null` members decode to their defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchQuery {
    #[serde(deserialize_with = "null_as_default")]
    pub sourcetype: String,
    #[serde(deserialize_with = "null_as_default")]
    pub field: String,
    #[serde(deserialize_with = "null_as_default")]
    pub limit: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub model: String,
}

/// The classifier's verdict for one field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmDecision {
    /// Classification kind (e.g. direct, derived, unmapped).
    pub mapping_type: Option<String>,
    /// Target ECS field name.
    pub mapped_field_name: Option<String>,
    /// ECS version the decision refers to.
    pub ecs_version: Option<String>,
    /// Free-text justification.
    pub rationale: Option<String>,
    /// Confidence score in `[0, 1]`; `null` reads as 0.
    #[serde(deserialize_with = "null_as_default")]
    pub confidence: f64,
    /// Fields this crate does not interpret, kept for export.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Whether the backend created a mapping row or matched an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DbStatus {
    Exists,
    Inserted,
    #[serde(other)]
    Unknown,
}

impl DbStatus {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Exists => "exists",
            Self::Inserted => "inserted",
            Self::Unknown => "unknown",
        }
    }
}

/// One classifier decision correlated to its submitted field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapBatchResultItem {
    #[serde(deserialize_with = "null_as_default")]
    pub query: BatchQuery,
    /// Retrieval hints; the schema belongs to the backend.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retrieval: Option<Value>,
    #[serde(deserialize_with = "null_as_default")]
    pub llm_decision: LlmDecision,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_status: Option<DbStatus>,
    /// Fields this crate does not interpret, kept for export.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    /// The item exactly as the backend sent it.
    #[serde(skip)]
    pub received: Option<Value>,
}

impl MapBatchResultItem {
    /// Decode one response item, keeping the received JSON alongside.
    pub fn from_value(value: Value) -> serde_json::Result<Self> {
        let mut item = Self::deserialize(&value)?;
        item.received = Some(value);
        Ok(item)
    }

    /// The JSON to export: the received item when there is one, otherwise
    /// the typed fields.
    pub fn to_value(&self) -> serde_json::Result<Value> {
        match &self.received {
            Some(value) => Ok(value.clone()),
            None => serde_json::to_value(self),
        }
    }
}

/// Body of a `/map-batch` response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapBatchResponse {
    pub results: Vec<MapBatchResultItem>,
}

impl MapBatchResponse {
    /// Decode a response body.
    ///
    /// A missing or non-array `results` member yields an empty response.
    pub fn from_value(body: Value) -> serde_json::Result<Self> {
        let results = match body {
            Value::Object(mut object) => match object.remove("results") {
                Some(Value::Array(items)) => items
                    .into_iter()
                    .map(MapBatchResultItem::from_value)
                    .collect::<serde_json::Result<Vec<_>>>()?,
                _ => Vec::new(),
            },
            _ => Vec::new(),
        };
        Ok(Self { results })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn missing_results_is_empty() {
        let response = MapBatchResponse::from_value(json!({"status": "ok"})).unwrap();
        assert!(response.results.is_empty());

        let response = MapBatchResponse::from_value(json!({"results": "nope"})).unwrap();
        assert!(response.results.is_empty());

        let response = MapBatchResponse::from_value(json!([1, 2, 3])).unwrap();
        assert!(response.results.is_empty());
    }

    #[test]
    fn null_members_decode_to_defaults() {
        let response = MapBatchResponse::from_value(json!({"results": [
            {
                "query": {"sourcetype": null, "field": null, "limit": null, "model": null},
                "llm_decision": {"mapping_type": "unmapped", "confidence": null}
            },
            {
                "query": {"field": "remote_addr"},
                "llm_decision": {"mapped_field_name": "source.ip", "confidence": 0.8}
            },
            {"query": null, "llm_decision": null}
        ]}))
        .unwrap();

        assert_eq!(response.results.len(), 3);
        let unmapped = &response.results[0];
        assert_eq!(unmapped.query, BatchQuery::default());
        assert_eq!(unmapped.llm_decision.confidence, 0.0);
        assert_eq!(
            unmapped.llm_decision.mapping_type.as_deref(),
            Some("unmapped")
        );
        assert_eq!(response.results[1].query.field, "remote_addr");
        assert_eq!(response.results[1].llm_decision.confidence, 0.8);
        assert_eq!(response.results[2].llm_decision, LlmDecision::default());
    }

    #[test]
    fn received_item_is_exported_unchanged() {
        let sparse = json!({
            "db_status": null,
            "llm_decision": {"mapped_field_name": "x"},
            "query": {"field": "a"},
            "retrieval": null
        });
        let item = MapBatchResultItem::from_value(sparse.clone()).unwrap();
        assert_eq!(item.db_status, None);
        assert_eq!(item.to_value().unwrap(), sparse);

        let local = MapBatchResultItem::default();
        assert!(local.to_value().unwrap().get("llm_decision").is_some());
    }

    #[test]
    fn unknown_db_status_is_tolerated() {
        let item: MapBatchResultItem =
            serde_json::from_value(json!({"db_status": "merged"})).unwrap();
        assert_eq!(item.db_status, Some(DbStatus::Unknown));
    }
}
