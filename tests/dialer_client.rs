//! Integration tests for the vendor calling client against a mock HTTP API.

use call_orchestrator::core::DialerConfig;
use call_orchestrator::dialer::{CallScript, DialerClient, Intent};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> DialerConfig {
    DialerConfig {
        base_url: server.uri(),
        api_key: "test-key".to_string(),
        pathway_id: "pathway-1".to_string(),
        voice_id: None,
        webhook_url: Some("https://example.com/webhook".to_string()),
    }
}

fn script() -> CallScript {
    CallScript {
        full_name: "Jane Doe".to_string(),
        job_title: "Registered Nurse".to_string(),
        location: "Austin, TX".to_string(),
        pay: "2400".to_string(),
        user_name: "42".to_string(),
        phone_number: None,
        work_experience: None,
    }
}

#[tokio::test]
async fn place_call_returns_call_id() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/calls"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "phone_number": "+15551234567",
            "pathway_id": "pathway-1",
            "request_data": { "full_name": "Jane Doe" },
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "call_id": "call-abc-123",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = DialerClient::new(&config_for(&server)).unwrap();
    let call_id = client.place_call("+15551234567", script()).await.unwrap();
    assert_eq!(call_id, "call-abc-123");
}

#[tokio::test]
async fn place_call_rejects_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/calls"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "status": "error",
            "message": "invalid phone number",
        })))
        .mount(&server)
        .await;

    let client = DialerClient::new(&config_for(&server)).unwrap();
    let err = client
        .place_call("+15551234567", script())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("400"));
}

#[tokio::test]
async fn place_call_without_call_id_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/calls"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "message": "queued",
        })))
        .mount(&server)
        .await;

    let client = DialerClient::new(&config_for(&server)).unwrap();
    assert!(client.place_call("+15551234567", script()).await.is_err());
}

#[tokio::test]
async fn analyze_intent_parses_object_answer() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/calls/call-1/analyze"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "answers": [{ "answer": "Yes" }],
        })))
        .mount(&server)
        .await;

    let client = DialerClient::new(&config_for(&server)).unwrap();
    assert_eq!(client.analyze_intent("call-1").await, Intent::Yes);
}

#[tokio::test]
async fn analyze_intent_parses_bare_string_answer() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/calls/call-2/analyze"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "answers": ["later"],
        })))
        .mount(&server)
        .await;

    let client = DialerClient::new(&config_for(&server)).unwrap();
    assert_eq!(client.analyze_intent("call-2").await, Intent::Later);
}

#[tokio::test]
async fn analyze_intent_maps_api_failure_to_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/calls/call-3/analyze"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = DialerClient::new(&config_for(&server)).unwrap();
    assert_eq!(client.analyze_intent("call-3").await, Intent::Error);
}

#[tokio::test]
async fn fetch_call_reads_completion_and_summary() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/calls/call-4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "call_id": "call-4",
            "status": "completed",
            "completed": true,
            "summary": "Candidate asked to be called back tomorrow.",
        })))
        .mount(&server)
        .await;

    let client = DialerClient::new(&config_for(&server)).unwrap();
    let details = client.fetch_call("call-4").await.unwrap();
    assert!(details.is_completed());
    assert_eq!(
        details.summary.as_deref(),
        Some("Candidate asked to be called back tomorrow.")
    );
}

#[tokio::test]
async fn call_summary_tolerates_fetch_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/calls/call-5"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = DialerClient::new(&config_for(&server)).unwrap();
    assert_eq!(client.call_summary("call-5").await, None);
}
