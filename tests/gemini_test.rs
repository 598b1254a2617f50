//! Wiremock integration tests for GeminiClient.

use std::time::Duration;

use lectio::{ErrorClass, GeminiClient, GenerateProvider, LectioError};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL: &str = "gemini-2.0-flash";
const ENDPOINT: &str = "/v1beta/models/gemini-2.0-flash:generateContent";

#[tokio::test]
async fn test_generate_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .and(header("x-goog-api-key", "test_key"))
        .and(body_partial_json(serde_json::json!({
            "contents": [{"parts": [{"text": "Explique Jean 3:16"}]}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "candidates": [{
                "content": {"parts": [{"text": "**VERSET 1**"}, {"text": " Car Dieu..."}]}
            }]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = GeminiClient::with_base_url(MODEL, mock_server.uri()).unwrap();
    let text = client
        .generate("Explique Jean 3:16", "test_key")
        .await
        .expect("generate should succeed");

    assert_eq!(text, "**VERSET 1** Car Dieu...");
}

#[tokio::test]
async fn test_generate_no_candidates_is_empty() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "candidates": []
        })))
        .mount(&mock_server)
        .await;

    let client = GeminiClient::with_base_url(MODEL, mock_server.uri()).unwrap();
    let text = client.generate("prompt", "test_key").await.unwrap();
    assert!(text.is_empty());
}

#[tokio::test]
async fn test_generate_rate_limited() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "17"))
        .mount(&mock_server)
        .await;

    let client = GeminiClient::with_base_url(MODEL, mock_server.uri()).unwrap();
    let err = client.generate("prompt", "test_key").await.unwrap_err();

    assert!(matches!(
        err,
        LectioError::RateLimited {
            retry_after: Some(d)
        } if d == Duration::from_secs(17)
    ));
    assert_eq!(err.class(), ErrorClass::Quota);
}

#[tokio::test]
async fn test_generate_invalid_key() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(403).set_body_string("API key not valid"))
        .mount(&mock_server)
        .await;

    let client = GeminiClient::with_base_url(MODEL, mock_server.uri()).unwrap();
    let err = client.generate("prompt", "bad_key").await.unwrap_err();

    assert!(matches!(err, LectioError::AuthenticationFailed));
    assert!(err.class().rotates_key());
}

#[tokio::test]
async fn test_generate_quota_message_in_400() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": {"status": "RESOURCE_EXHAUSTED", "message": "Quota exceeded for metric"}
        })))
        .mount(&mock_server)
        .await;

    let client = GeminiClient::with_base_url(MODEL, mock_server.uri()).unwrap();
    let err = client.generate("prompt", "test_key").await.unwrap_err();

    assert!(matches!(err, LectioError::Api { status: 400, .. }));
    assert_eq!(err.class(), ErrorClass::Quota);
}

#[tokio::test]
async fn test_generate_server_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(503).set_body_string("backend unavailable"))
        .mount(&mock_server)
        .await;

    let client = GeminiClient::with_base_url(MODEL, mock_server.uri()).unwrap();
    let err = client.generate("prompt", "test_key").await.unwrap_err();

    match &err {
        LectioError::Api { status, message } => {
            assert_eq!(*status, 503);
            assert_eq!(message, "backend unavailable");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
    assert_eq!(err.class(), ErrorClass::Transient);
    assert!(!err.class().rotates_key());
}
