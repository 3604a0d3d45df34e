//! Endpoint test for resume upload: multipart form in, extracted fields out.
//!
//! Uploaded file names arrive with their extension stripped by multipart
//! sanitization, so the handler must recover the format from the declared
//! content type. Persistence is exercised against an unreachable pool: a
//! storage failure degrades to `candidate_id: null`, it does not fail the
//! request.

use call_orchestrator::core::{Database, DialerConfig, ExtractionConfig, TimingConfig};
use call_orchestrator::dialer::DialerClient;
use call_orchestrator::extraction::FieldExtractor;
use call_orchestrator::lifecycle::{CallContext, WebhookTracker};
use call_orchestrator::web::process_resume;
use rocket::http::{ContentType, Status};
use rocket::local::asynchronous::Client;
use rocket::routes;
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BOUNDARY: &str = "X-RESUME-BOUNDARY";

fn multipart_body(filename: &str, part_content_type: &str, content: &str) -> String {
    format!(
        "--{b}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
         Content-Type: {part_content_type}\r\n\
         \r\n\
         {content}\r\n\
         --{b}--\r\n",
        b = BOUNDARY,
    )
}

async fn test_client(extraction_server: &MockServer) -> Client {
    let pool = PgPoolOptions::new()
        .acquire_timeout(Duration::from_millis(100))
        .connect_lazy("postgres://127.0.0.1:1/unreachable")
        .expect("lazy pool");

    let dialer = DialerClient::new(&DialerConfig {
        base_url: "http://127.0.0.1:9".to_string(),
        api_key: "test-key".to_string(),
        pathway_id: "pathway-1".to_string(),
        voice_id: None,
        webhook_url: None,
    })
    .expect("client");

    let ctx = CallContext {
        db: Database::from_pool(pool),
        dialer,
        tracker: Arc::new(WebhookTracker::new()),
        timing: TimingConfig::default(),
    };

    let extractor = FieldExtractor::new(&ExtractionConfig {
        api_url: format!("{}/v1/chat/completions", extraction_server.uri()),
        api_key: "test-key".to_string(),
        model: "gpt-4o-mini".to_string(),
    })
    .expect("extractor");

    let rocket = rocket::build()
        .manage(ctx)
        .manage(extractor)
        .mount("/", routes![process_resume]);

    Client::tracked(rocket).await.expect("rocket client")
}

#[tokio::test]
async fn text_resume_upload_returns_extracted_fields() {
    let server = MockServer::start().await;

    let content = "```json\n{\"name\": \"Jane Doe\", \"phone\": \"5551234567\"}\n```";
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [
                { "message": { "role": "assistant", "content": content } }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server).await;

    let response = client
        .post("/process-resume")
        .header(
            ContentType::new("multipart", "form-data").with_params(("boundary", BOUNDARY)),
        )
        .body(multipart_body(
            "resume.txt",
            "text/plain",
            "Jane Doe\nRegistered Nurse\n555-123-4567",
        ))
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::Ok);
    let body: Value = response.into_json().await.expect("json body");
    assert_eq!(body["status"], "success");
    assert_eq!(body["content"]["full_name"], "Jane Doe");
    assert_eq!(body["content"]["phone_numbers"], "5551234567");
    // The database is unreachable in this test; the extraction survives.
    assert_eq!(body["candidate_id"], Value::Null);
}

#[tokio::test]
async fn unsupported_upload_type_is_rejected() {
    let server = MockServer::start().await;
    let client = test_client(&server).await;

    let response = client
        .post("/process-resume")
        .header(
            ContentType::new("multipart", "form-data").with_params(("boundary", BOUNDARY)),
        )
        .body(multipart_body("resume.zip", "application/zip", "PK"))
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::Ok);
    let body: Value = response.into_json().await.expect("json body");
    assert_eq!(body["success"], false);
    assert_eq!(body["error_code"], "UNSUPPORTED_FORMAT");
    // No extraction call was made for a rejected upload.
    assert!(server.received_requests().await.unwrap().is_empty());
}
