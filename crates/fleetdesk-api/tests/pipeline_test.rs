#![allow(clippy::unwrap_used)]
// Integration tests for the request pipeline using wiremock.

use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, header, header_regex, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use fleetdesk_api::{
    ApiClient, Error, FilePart, Method, MultipartBody, RequestBody, RequestError, SessionContext,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup(session: SessionContext) -> (MockServer, ApiClient) {
    let server = MockServer::start().await;
    let client = ApiClient::with_client(reqwest::Client::new(), &server.uri(), session).unwrap();
    (server, client)
}

// ── Credential ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_bearer_token_is_attached() {
    let (server, client) = setup(SessionContext::with_token("tok-123")).await;

    Mock::given(method("GET"))
        .and(path("/organizations"))
        .and(header("authorization", "Bearer tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let value = client.get("organizations").await.unwrap();
    assert_eq!(value, json!([]));
}

#[tokio::test]
async fn test_missing_token_short_circuits() {
    let (server, client) = setup(SessionContext::in_memory()).await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let result = client.get("organizations").await;
    assert!(
        matches!(result, Err(Error::Unauthenticated)),
        "expected Unauthenticated, got: {result:?}"
    );
}

#[tokio::test]
async fn test_token_change_applies_to_next_call() {
    let session = SessionContext::in_memory();
    let (server, client) = setup(session.clone()).await;

    Mock::given(method("GET"))
        .and(header("authorization", "Bearer later"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    assert!(client.get("devices").await.is_err());
    session
        .set_tokens(secrecy::SecretString::from("later"), None)
        .unwrap();
    assert_eq!(client.get("devices").await.unwrap(), serde_json::Value::Null);
}

// ── Bodies ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_json_body() {
    let (server, client) = setup(SessionContext::with_token("t")).await;

    Mock::given(method("POST"))
        .and(path("/organizations"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({ "name": "Org B" })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({ "id": "2", "name": "Org B" })),
        )
        .mount(&server)
        .await;

    let echo = client
        .post("organizations", RequestBody::Json(json!({ "name": "Org B" })))
        .await
        .unwrap();
    assert_eq!(echo["id"], "2");
}

#[tokio::test]
async fn test_multipart_body_lets_transport_set_boundary() {
    let (server, client) = setup(SessionContext::with_token("t")).await;

    Mock::given(method("PUT"))
        .and(path("/devices/9"))
        .and(header_regex("content-type", "^multipart/form-data; boundary="))
        .and(body_string_contains("name=\"name\""))
        .and(body_string_contains("Sensor 9"))
        .and(body_string_contains("name=\"image\"; filename=\"cam.png\""))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let body = MultipartBody::new()
        .text("name", "Sensor 9")
        .file(FilePart::from_bytes("image", "cam.png", b"\x89PNG".to_vec()));

    let value = client
        .call(Method::PUT, "devices/9", Some(RequestBody::Multipart(body)))
        .await
        .unwrap();
    assert_eq!(value, serde_json::Value::Null);
}

// ── Status classification ───────────────────────────────────────────

#[tokio::test]
async fn test_empty_success_body_is_null() {
    let (server, client) = setup(SessionContext::with_token("t")).await;

    Mock::given(method("DELETE"))
        .and(path("/organizations/1"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    assert_eq!(
        client.delete("organizations/1").await.unwrap(),
        serde_json::Value::Null
    );
}

#[tokio::test]
async fn test_plain_text_success_body_passes_through() {
    let (server, client) = setup(SessionContext::with_token("t")).await;

    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Deleted"))
        .mount(&server)
        .await;

    assert_eq!(
        client.delete("payments/3").await.unwrap(),
        serde_json::Value::String("Deleted".into())
    );
}

#[tokio::test]
async fn test_error_body_is_surfaced_verbatim() {
    let (server, client) = setup(SessionContext::with_token("t")).await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(409).set_body_string("Organization already exists"))
        .mount(&server)
        .await;

    let result = client
        .post("organizations", RequestBody::Json(json!({ "name": "Dup" })))
        .await;

    match result {
        Err(Error::Request(RequestError { status, message })) => {
            assert_eq!(status, Some(409));
            assert_eq!(message, "Organization already exists");
        }
        other => panic!("expected Request error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_error_without_body_uses_generic_message() {
    let (server, client) = setup(SessionContext::with_token("t")).await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    match client.get("devices").await {
        Err(Error::Request(err)) => {
            assert_eq!(err.status, Some(500));
            assert_eq!(err.message, "HTTP status 500");
        }
        other => panic!("expected Request error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_stale_token_is_reported_as_auth_expired() {
    let (server, client) = setup(SessionContext::with_token("expired")).await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_string("token expired"))
        .mount(&server)
        .await;

    let err = client.get("devices").await.unwrap_err();
    assert!(err.is_auth_expired());
    assert_eq!(err.status(), Some(401));
}

#[tokio::test]
async fn test_transport_failure_has_no_status() {
    // Nothing listens on port 1.
    let client = ApiClient::with_client(
        reqwest::Client::new(),
        "http://127.0.0.1:1/",
        SessionContext::with_token("t"),
    )
    .unwrap();

    match client.get("devices").await {
        Err(Error::Request(err)) => {
            assert_eq!(err.status, None);
            assert!(!err.message.is_empty());
        }
        other => panic!("expected transport error, got: {other:?}"),
    }
}
