//! Batch payload building from pasted log samples.
//!
//! Input text is a single JSON object or an array of JSON objects. The field
//! set is the union over every document; descriptions are sampled from the
//! first document only.

use std::collections::BTreeSet;

use serde_json::{Map, Value};
use tracing::debug;

use ecs_model::{BatchConfig, BatchInputItem, FieldPath, FieldSample};

use crate::error::PayloadError;
use crate::extract::PathExtractor;

/// Build the batch payload for `input`.
///
/// Returns `Ok(None)` for empty or whitespace-only input: there is no
/// payload yet, which is not an error.
pub fn build_batch_payload(
    input: &str,
    config: &BatchConfig,
    extractor: &PathExtractor,
) -> Result<Option<Vec<BatchInputItem>>, PayloadError> {
    if input.trim().is_empty() {
        return Ok(None);
    }

    let value: Value =
        serde_json::from_str(input).map_err(|err| PayloadError::Parse(err.to_string()))?;
    let documents = documents(&value)?;
    let Some((first, rest)) = documents.split_first() else {
        return Err(PayloadError::Shape);
    };

    let samples = extractor.extract_document(first);
    let mut paths: BTreeSet<FieldPath> = samples.keys().cloned().collect();
    for document in rest {
        paths.extend(extractor.extract_document(document).into_keys());
    }
    if paths.is_empty() {
        return Err(PayloadError::NoFields);
    }

    debug!(
        documents = documents.len(),
        fields = paths.len(),
        "built batch payload"
    );

    let items = paths
        .into_iter()
        .map(|path| {
            let description = describe(&path, samples.get(&path));
            BatchInputItem {
                sourcetype: config.sourcetype.clone(),
                field: path,
                description,
            }
        })
        .collect();
    Ok(Some(items))
}

/// Split the parsed input into documents, keeping only plain objects.
fn documents(value: &Value) -> Result<Vec<&Map<String, Value>>, PayloadError> {
    match value {
        Value::Object(document) => Ok(vec![document]),
        Value::Array(items) => Ok(items.iter().filter_map(Value::as_object).collect()),
        _ => Err(PayloadError::Shape),
    }
}

fn describe(path: &FieldPath, sample: Option<&FieldSample>) -> String {
    match sample.and_then(FieldSample::as_scalar) {
        Some(text) => text.to_string(),
        None => format!("field {path}"),
    }
}

/// Whether a build reports its failure to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feedback {
    /// Live preview: failures produce no payload and no message.
    Silent,
    /// Explicit action: failures set the inline error message.
    Report,
}

/// Input text, batch settings, and the inline error slot of the batch form.
#[derive(Debug, Clone, Default)]
pub struct BatchComposer {
    input: String,
    config: BatchConfig,
    extractor: PathExtractor,
    error: Option<String>,
}

impl BatchComposer {
    pub fn new(config: BatchConfig, extractor: PathExtractor) -> Self {
        Self {
            config,
            extractor,
            ..Self::default()
        }
    }

    /// Set the input text.
    #[must_use]
    pub fn with_input(mut self, input: impl Into<String>) -> Self {
        self.input = input.into();
        self
    }

    pub fn set_input(&mut self, input: impl Into<String>) {
        self.input = input.into();
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut BatchConfig {
        &mut self.config
    }

    /// Inline error from the last reported build.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Build the payload for the current input.
    ///
    /// Returns `None` when there is no input yet or the input is rejected.
    pub fn build_payload(&mut self, feedback: Feedback) -> Option<Vec<BatchInputItem>> {
        match build_batch_payload(&self.input, &self.config, &self.extractor) {
            Ok(Some(items)) => {
                if feedback == Feedback::Report {
                    self.error = None;
                }
                Some(items)
            }
            Ok(None) => None,
            Err(error) => {
                debug!(%error, ?feedback, "batch input rejected");
                if feedback == Feedback::Report {
                    self.error = Some(error.to_string());
                }
                None
            }
        }
    }

    /// Silent build for live previews; never touches the error slot.
    pub fn preview(&mut self) -> Vec<BatchInputItem> {
        self.build_payload(Feedback::Silent).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn build(input: &str) -> Result<Option<Vec<BatchInputItem>>, PayloadError> {
        build_batch_payload(input, &BatchConfig::default(), &PathExtractor::default())
    }

    #[test]
    fn empty_input_is_not_an_error() {
        assert_eq!(build(""), Ok(None));
        assert_eq!(build("  \n\t "), Ok(None));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(build("{not json"), Err(PayloadError::Parse(_))));
    }

    #[test]
    fn wrong_shapes_are_rejected() {
        assert_eq!(build("42"), Err(PayloadError::Shape));
        assert_eq!(build("\"text\""), Err(PayloadError::Shape));
        assert_eq!(build("[1, 2, \"x\"]"), Err(PayloadError::Shape));
        assert_eq!(build("[]"), Err(PayloadError::Shape));
        assert_eq!(build("{}"), Err(PayloadError::NoFields));
    }

    #[test]
    fn descriptions_come_from_first_document() {
        let input = json!([
            {"host": "web-1", "http": {"status": 200}, "tags": ["a"]},
            {"host": "web-2", "user": {"name": "ana"}}
        ])
        .to_string();
        let items = build(&input).unwrap().unwrap();

        let described: Vec<(&str, &str)> = items
            .iter()
            .map(|item| (item.field.as_str(), item.description.as_str()))
            .collect();
        assert_eq!(
            described,
            vec![
                ("host", "web-1"),
                ("http", "field http"),
                ("http.status", "200"),
                ("tags", "field tags"),
                ("user", "field user"),
                ("user.name", "field user.name"),
            ]
        );
        assert!(items.iter().all(|item| item.sourcetype == "generic"));
    }

    #[test]
    fn non_object_entries_are_skipped() {
        let items = build(r#"[1, {"a": null}, "x"]"#).unwrap().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].description, "field a");
    }
}
