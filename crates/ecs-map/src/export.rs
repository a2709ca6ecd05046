//! Local file exports: the raw batch decisions as JSON and the mapping
//! table view as CSV. Neither involves a server round trip.

use std::fs;
use std::path::Path;

use csv::{QuoteStyle, Terminator, WriterBuilder};
use serde::Serialize;
use serde_json::Value;

use ecs_model::{MapBatchResultItem, MappingRow};

use crate::error::ExportError;

/// Default file name of the batch decision export.
pub const BATCH_EXPORT_FILE_NAME: &str = "ecs-mappings-batch.json";

/// Default file name of the mapping table export.
pub const CSV_EXPORT_FILE_NAME: &str = "ecs-mappings.csv";

/// Column order of the CSV export.
pub const CSV_COLUMNS: [&str; 10] = [
    "id",
    "sourcetype",
    "source_field",
    "mapped_field_name",
    "mapped_field_name_underscore",
    "mapping_type",
    "confidence",
    "human_verified",
    "created_at",
    "rationale",
];

#[derive(Serialize)]
struct BatchExport {
    results: Vec<Value>,
}

/// Pretty-printed `{ "results": [...] }` document for the given decisions.
///
/// Decoded items are written as the backend sent them.
pub fn results_to_json(results: &[MapBatchResultItem]) -> Result<String, ExportError> {
    if results.is_empty() {
        return Err(ExportError::Empty);
    }
    let results = results
        .iter()
        .map(MapBatchResultItem::to_value)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(serde_json::to_string_pretty(&BatchExport { results })?)
}

/// CSV document with a header line and one line per row.
///
/// Every value is quoted; embedded quotes are doubled.
pub fn rows_to_csv<'a>(
    rows: impl IntoIterator<Item = &'a MappingRow>,
) -> Result<String, ExportError> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(CSV_COLUMNS)?;
    for row in rows {
        writer.write_record(csv_record(row))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| ExportError::Csv(err.to_string()))?;
    String::from_utf8(bytes).map_err(|err| ExportError::Csv(err.to_string()))
}

fn csv_record(row: &MappingRow) -> [String; 10] {
    [
        row.id.to_string(),
        row.sourcetype.clone(),
        row.source_field.clone(),
        row.mapped_field_name.clone(),
        row.mapped_field_name_underscore(),
        row.mapping_type.clone().unwrap_or_default(),
        row.confidence.map(|c| c.to_string()).unwrap_or_default(),
        row.human_verified.to_string(),
        row.created_at.clone().unwrap_or_default(),
        row.rationale.clone().unwrap_or_default(),
    ]
}

/// Write an export document to `path` as UTF-8.
pub fn write_export(path: &Path, contents: &str) -> Result<(), ExportError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|source| ExportError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, contents).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!("Wrote export to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_results_cannot_be_exported() {
        assert!(matches!(results_to_json(&[]), Err(ExportError::Empty)));
    }

    #[test]
    fn header_only_for_no_rows() {
        let csv = rows_to_csv(std::iter::empty()).unwrap();
        assert_eq!(csv.lines().count(), 1);
        assert!(csv.starts_with("\"id\",\"sourcetype\""));
    }
}
