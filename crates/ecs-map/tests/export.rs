//! Export document tests.

use serde_json::json;

use ecs_map::{ExportError, results_to_json, rows_to_csv, write_export};
use ecs_model::{MapBatchResponse, MappingId, MappingRow};

fn rows() -> Vec<MappingRow> {
    vec![
        MappingRow {
            id: MappingId::Int(7),
            sourcetype: "nginx".to_string(),
            source_field: "remote_addr".to_string(),
            mapped_field_name: "source.ip".to_string(),
            mapping_type: Some("direct".to_string()),
            rationale: Some(r#"client "IP" address"#.to_string()),
            confidence: Some(0.93),
            created_at: Some("2024-05-01T12:00:00Z".to_string()),
            human_verified: true,
        },
        MappingRow {
            id: MappingId::Text("m-2".to_string()),
            sourcetype: "syslog".to_string(),
            source_field: "msg".to_string(),
            mapped_field_name: "message".to_string(),
            mapping_type: None,
            rationale: None,
            confidence: None,
            created_at: None,
            human_verified: false,
        },
    ]
}

#[test]
fn csv_document_layout() {
    let csv = rows_to_csv(&rows()).expect("render csv");

    insta::assert_snapshot!(csv.trim_end(), @r#"
    "id","sourcetype","source_field","mapped_field_name","mapped_field_name_underscore","mapping_type","confidence","human_verified","created_at","rationale"
    "7","nginx","remote_addr","source.ip","source_ip","direct","0.93","true","2024-05-01T12:00:00Z","client ""IP"" address"
    "m-2","syslog","msg","message","message","","","false","",""
    "#);
}

#[test]
fn csv_has_one_line_per_row_plus_header() {
    let rows = rows();
    let csv = rows_to_csv(&rows).expect("render csv");
    assert_eq!(csv.lines().count(), rows.len() + 1);
    assert!(csv.ends_with('\n'));
    assert!(!csv.contains('\r'));
}

#[test]
fn json_export_repeats_received_results() {
    let sparse = json!({
        "db_status": null,
        "llm_decision": {"mapped_field_name": "x"},
        "query": {"field": "a"},
        "retrieval": null
    });
    let body = json!({"results": [sparse]});
    let response = MapBatchResponse::from_value(body.clone()).expect("decode response");

    let exported = results_to_json(&response.results).expect("export results");

    assert_eq!(
        exported,
        serde_json::to_string_pretty(&body).expect("render body")
    );
    assert!(!exported.contains("confidence"));
}

#[test]
fn write_export_creates_parent_directories() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("exports").join("ecs-mappings.csv");
    let csv = rows_to_csv(&rows()).expect("render csv");

    write_export(&path, &csv).expect("write export");

    let written = std::fs::read_to_string(&path).expect("read export");
    assert_eq!(written, csv);
}

#[test]
fn write_export_reports_path_on_failure() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "").expect("create file");

    let err = write_export(&blocker.join("out.json"), "{}").expect_err("parent is a file");
    match err {
        ExportError::Io { path, .. } => assert_eq!(path, blocker),
        other => panic!("unexpected error: {other}"),
    }
}
