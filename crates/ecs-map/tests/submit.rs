//! Integration tests for the batch submission flow.

mod support;

use ecs_map::{BatchComposer, BatchSession, Feedback, PathExtractor, ServiceError};
use ecs_model::BatchConfig;
use serde_json::Value;

use support::{Call, FakeService, decision};

fn composer(input: &str) -> BatchComposer {
    let config = BatchConfig {
        sourcetype: "nginx".to_string(),
        model: "gpt-4o-mini".to_string(),
        limit: 3,
    };
    BatchComposer::new(config, PathExtractor::default()).with_input(input)
}

#[tokio::test]
async fn successful_submission_replaces_rows() {
    let service = FakeService {
        batch: Ok(vec![
            decision("remote_addr", "source.ip", 0.934),
            decision("status", "http.response.status_code", 0.8),
        ]),
        ..FakeService::default()
    };
    let mut session = BatchSession::new();

    session
        .submit(&service, &[], "gpt-4o-mini", 3)
        .await
        .expect("submit batch");

    let rows = session.rows();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].field, "remote_addr");
    assert_eq!(rows[0].mapped_field_name.as_deref(), Some("source.ip"));
    assert_eq!(rows[0].confidence, "0.93");
    assert_eq!(rows[1].confidence, "0.80");
    assert!(session.error().is_none());
    assert!(!session.is_in_flight());
}

#[tokio::test]
async fn payload_from_composer_is_sent_with_model_and_limit() {
    let mut composer = composer(r#"[{"host": "a", "http": {"status": 200}}, {"user": "u"}]"#);
    let payload = composer
        .build_payload(Feedback::Report)
        .expect("payload present");
    let service = FakeService::default();
    let mut session = BatchSession::new();

    session
        .submit(
            &service,
            &payload,
            &composer.config().model,
            composer.config().limit,
        )
        .await
        .expect("submit batch");

    assert_eq!(
        service.calls(),
        vec![Call::MapBatch {
            fields: vec![
                "host".to_string(),
                "http".to_string(),
                "http.status".to_string(),
                "user".to_string(),
            ],
            model: "gpt-4o-mini".to_string(),
            limit: 3,
        }]
    );
    assert!(payload.iter().all(|item| item.sourcetype == "nginx"));
}

#[tokio::test]
async fn failure_clears_previous_results() {
    let mut session = BatchSession::new();
    let ok = FakeService {
        batch: Ok(vec![decision("a", "b", 0.5)]),
        ..FakeService::default()
    };
    session.submit(&ok, &[], "m", 1).await.expect("first submit");
    assert_eq!(session.results().len(), 1);

    let failing = FakeService {
        batch: Err(ServiceError::Status {
            status: 500,
            detail: Some("model quota exceeded".to_string()),
        }),
        ..FakeService::default()
    };
    let err = session
        .submit(&failing, &[], "m", 1)
        .await
        .expect_err("second submit fails");

    assert!(matches!(err, ServiceError::Status { status: 500, .. }));
    assert!(session.results().is_empty());
    assert_eq!(session.error(), Some("model quota exceeded"));

    session.submit(&ok, &[], "m", 1).await.expect("retry");
    assert!(session.error().is_none());
}

#[tokio::test]
async fn export_wraps_current_results() {
    let service = FakeService {
        batch: Ok(vec![decision("remote_addr", "source.ip", 0.9)]),
        ..FakeService::default()
    };
    let mut session = BatchSession::new();
    session.submit(&service, &[], "m", 1).await.expect("submit");

    let json = session.export_json().expect("export json");
    assert!(json.contains('\n'), "export is pretty-printed");

    let value: Value = serde_json::from_str(&json).expect("parse export");
    let results = value["results"].as_array().expect("results array");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["query"]["field"], "remote_addr");
    assert_eq!(results[0]["llm_decision"]["mapped_field_name"], "source.ip");
}

#[test]
fn empty_input_sets_no_error_in_either_mode() {
    let mut silent = composer("   ");
    assert!(silent.build_payload(Feedback::Silent).is_none());
    assert!(silent.error().is_none());

    let mut report = composer("");
    assert!(report.build_payload(Feedback::Report).is_none());
    assert!(report.error().is_none());
}

#[test]
fn parse_error_message_only_when_reporting() {
    let mut silent = composer("{not json");
    assert!(silent.build_payload(Feedback::Silent).is_none());
    assert!(silent.error().is_none());
    assert!(silent.preview().is_empty());

    let mut report = composer("{not json");
    assert!(report.build_payload(Feedback::Report).is_none());
    let message = report.error().expect("parse error reported");
    assert!(message.starts_with("Invalid JSON"));
}

#[test]
fn shape_error_message_and_recovery() {
    let mut composer = composer("[1, 2]");
    assert!(composer.build_payload(Feedback::Report).is_none());
    assert_eq!(
        composer.error(),
        Some("Input must be an object or array of objects")
    );

    composer.set_input(r#"{"a": 1}"#);
    assert!(composer.build_payload(Feedback::Report).is_some());
    assert!(composer.error().is_none());
}
