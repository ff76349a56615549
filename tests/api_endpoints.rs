//! Router-level tests with scripted model and transcription providers.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use lexplain::analysis::Analyzer;
use lexplain::api::{router, AppState};
use lexplain::audit::AuditRecorder;
use lexplain::generate::GenerativeProvider;
use lexplain::transcribe::TranscriptionProvider;
use serde_json::Value;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use tower_http::cors::CorsLayer;

/// Generative provider that replays scripted completions in order.
struct ScriptedModel {
    responses: Mutex<VecDeque<Result<String>>>,
}

impl ScriptedModel {
    fn new(responses: Vec<Result<String>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
        }
    }
}

#[async_trait]
impl GenerativeProvider for ScriptedModel {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn model_id(&self) -> &str {
        "stub-model"
    }

    async fn complete(&self, _prompt: &str, _max_tokens: u32) -> Result<String> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(anyhow!("no scripted response left")))
    }
}

struct StubTranscriber {
    transcript: Result<String>,
}

#[async_trait]
impl TranscriptionProvider for StubTranscriber {
    fn name(&self) -> &'static str {
        "stub"
    }

    async fn transcribe(&self, _audio_path: &Path) -> Result<String> {
        match &self.transcript {
            Ok(text) => Ok(text.clone()),
            Err(err) => Err(anyhow!("{err}")),
        }
    }
}

struct TestServer {
    app: axum::Router,
    audit: AuditRecorder,
    _log_dir: tempfile::TempDir,
}

fn test_server(responses: Vec<Result<String>>, transcript: Result<String>) -> TestServer {
    let log_dir = tempfile::tempdir().unwrap();
    let audit = AuditRecorder::new(log_dir.path());

    let state = AppState {
        analyzer: Arc::new(Analyzer::new(Box::new(ScriptedModel::new(responses)), 8000)),
        transcriber: Arc::new(StubTranscriber { transcript }),
        audit: audit.clone(),
    };

    TestServer {
        app: router(state, CorsLayer::new()),
        audit,
        _log_dir: log_dir,
    }
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn multipart_request(uri: &str, file_name: &str, content: &[u8]) -> Request<Body> {
    let boundary = "test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn event_kinds(audit: &AuditRecorder) -> Vec<&'static str> {
    audit
        .all_events()
        .iter()
        .map(|entry| entry.event.kind())
        .collect()
}

#[tokio::test]
async fn test_logs_endpoint_reflects_recorded_events() {
    let server = test_server(Vec::new(), Ok(String::new()));

    let response = server
        .app
        .clone()
        .oneshot(Request::builder().uri("/api/logs").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"]["count"], 0);

    server.audit.record_text_extraction(10, 2);

    let response = server
        .app
        .clone()
        .oneshot(Request::builder().uri("/api/logs").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["data"]["count"], 1);
    assert_eq!(body["data"]["logs"][0]["event_type"], "text_extraction");
    assert_eq!(
        body["data"]["session_id"],
        server.audit.session_id().to_string().as_str()
    );
}

#[tokio::test]
async fn test_upload_txt_extracts_and_records() {
    let server = test_server(Vec::new(), Ok(String::new()));

    let response = server
        .app
        .clone()
        .oneshot(multipart_request(
            "/api/upload",
            "act.txt",
            b"Section 1. Short Title\n\nThis Act may be cited.",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["file_type"], "txt");
    assert_eq!(body["data"]["word_count"], 9);

    assert_eq!(
        event_kinds(&server.audit),
        vec!["document_upload", "text_extraction"]
    );
}

#[tokio::test]
async fn test_upload_unsupported_extension_is_client_error() {
    let server = test_server(Vec::new(), Ok(String::new()));

    let response = server
        .app
        .clone()
        .oneshot(multipart_request("/api/upload", "notes.xyz", b"data"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"], true);
    assert!(body["message"].as_str().unwrap().contains("xyz"));

    assert_eq!(event_kinds(&server.audit), vec!["error"]);
}

#[tokio::test]
async fn test_upload_without_file_field_is_client_error() {
    let server = test_server(Vec::new(), Ok(String::new()));

    let boundary = "test-boundary";
    let body = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"other\"\r\n\r\nhello\r\n--{boundary}--\r\n"
    );
    let request = Request::builder()
        .method("POST")
        .uri("/api/upload")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap();

    let response = server.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_analyze_returns_sections_simplifications_and_rights() {
    let server = test_server(
        vec![
            // Segmentation, then one simplification per section, then rights.
            Ok(r#"{"title": "Lease Act", "sections": [{"heading": "Section 1", "body": "The tenant shall..."}]}"#.to_string()),
            Ok(r#"{"plain_summary": "The renter must...", "key_points": ["a"], "ambiguous_terms": [], "readability_note": "ok"}"#.to_string()),
            Ok(r#"[{"right_name": "Right to Counsel", "plain_explanation": "A lawyer can represent you."}]"#.to_string()),
        ],
        Ok(String::new()),
    );

    let response = server
        .app
        .clone()
        .oneshot(json_request(
            "/api/analyze",
            serde_json::json!({ "text": "Full lease text." }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"]["segmented_doc"]["title"], "Lease Act");
    assert_eq!(
        body["data"]["simplified_sections"]["Section 1"]["plain_summary"],
        "The renter must..."
    );
    assert_eq!(
        body["data"]["detected_rights"][0]["right_name"],
        "Right to Counsel"
    );

    assert_eq!(
        event_kinds(&server.audit),
        vec!["ai_operation", "ai_operation", "ai_operation"]
    );
}

#[tokio::test]
async fn test_analyze_without_rights_detection() {
    let server = test_server(
        vec![
            Ok(r#"{"title": "Act", "sections": []}"#.to_string()),
        ],
        Ok(String::new()),
    );

    let response = server
        .app
        .clone()
        .oneshot(json_request(
            "/api/analyze",
            serde_json::json!({ "text": "Text.", "detect_rights": false }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"]["detected_rights"], serde_json::json!([]));
    // Only the segmentation call was made.
    assert_eq!(event_kinds(&server.audit), vec!["ai_operation"]);
}

#[tokio::test]
async fn test_analyze_empty_text_is_client_error() {
    let server = test_server(Vec::new(), Ok(String::new()));

    let response = server
        .app
        .clone()
        .oneshot(json_request(
            "/api/analyze",
            serde_json::json!({ "text": "   " }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_translate_success_records_translation() {
    let server = test_server(vec![Ok("Hola mundo".to_string())], Ok(String::new()));

    let response = server
        .app
        .clone()
        .oneshot(json_request(
            "/api/translate",
            serde_json::json!({ "text": "Hello world", "target_language": "Spanish" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"]["translation"], "Hola mundo");
    assert_eq!(body["data"]["target_language"], "Spanish");

    assert_eq!(event_kinds(&server.audit), vec!["translation"]);
}

#[tokio::test]
async fn test_translate_upstream_failure_is_server_error() {
    let server = test_server(vec![Err(anyhow!("quota exhausted"))], Ok(String::new()));

    let response = server
        .app
        .clone()
        .oneshot(json_request(
            "/api/translate",
            serde_json::json!({ "text": "Hello", "target_language": "Spanish" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert!(body["message"].as_str().unwrap().contains("Translation failed"));

    assert_eq!(event_kinds(&server.audit), vec!["error"]);
}

#[tokio::test]
async fn test_simplify_falls_back_on_unparsable_output() {
    let server = test_server(
        vec![Ok("I'm sorry, I can't help with that.".to_string())],
        Ok(String::new()),
    );

    let response = server
        .app
        .clone()
        .oneshot(json_request(
            "/api/simplify",
            serde_json::json!({ "text": "The party of the first part..." }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["readability_note"], "Processing failed");
}

#[tokio::test]
async fn test_audio_upload_returns_transcript_and_summary() {
    let server = test_server(
        vec![Ok("The judge overruled the objection.".to_string())],
        Ok("All rise. Objection! Overruled.".to_string()),
    );

    let response = server
        .app
        .clone()
        .oneshot(multipart_request(
            "/api/audio",
            "hearing.wav",
            b"RIFFfakewavdata",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"]["transcript"], "All rise. Objection! Overruled.");
    assert_eq!(body["data"]["summary"], "The judge overruled the objection.");

    assert_eq!(
        event_kinds(&server.audit),
        vec!["audio_upload", "ai_operation"]
    );
}

#[tokio::test]
async fn test_audio_upload_transcription_failure_is_server_error() {
    let server = test_server(Vec::new(), Err(anyhow!("unsupported codec")));

    let response = server
        .app
        .clone()
        .oneshot(multipart_request("/api/audio", "hearing.ogg", b"oggdata"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(event_kinds(&server.audit), vec!["audio_upload", "error"]);
}

#[tokio::test]
async fn test_status_endpoint_reports_session() {
    let server = test_server(Vec::new(), Ok(String::new()));

    let response = server
        .app
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["service"], "lexplain");
    assert_eq!(
        body["session_id"],
        server.audit.session_id().to_string().as_str()
    );
}
