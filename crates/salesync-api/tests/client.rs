//! Integration tests for `ApiClient` using wiremock HTTP mocks.

use std::time::Duration;

use chrono::NaiveDate;
use salesync_api::{ApiClient, AuthError, SubmitResult};
use salesync_core::{group, Credentials, Document, SourceRow};
use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> ApiClient {
    ApiClient::new(base_url, Duration::from_secs(5), Duration::from_secs(5))
        .expect("client construction should not fail")
}

fn credentials() -> Credentials {
    Credentials {
        username: "agent".to_string(),
        password: "s3cret".to_string(),
        company: "ACME".to_string(),
        instance: "DEFAULT".to_string(),
        grant_type: "password".to_string(),
        line: "professional".to_string(),
        bearer_token: None,
    }
}

fn sample_document() -> Document {
    let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let rows = vec![
        SourceRow {
            doc_type: "FT".to_string(),
            work_date: date,
            designation: "A".to_string(),
            quantity: 2,
        },
        SourceRow {
            doc_type: "FT".to_string(),
            work_date: date,
            designation: "B".to_string(),
            quantity: 1,
        },
    ];
    group(rows).remove(0)
}

// ---------------------------------------------------------------------------
// Token refresh
// ---------------------------------------------------------------------------

#[tokio::test]
async fn refresh_token_posts_form_and_returns_access_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("username=agent"))
        .and(body_string_contains("grant_type=password"))
        .and(body_string_contains("line=professional"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "tok-1",
            "token_type": "bearer",
            "expires_in": 1200
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let token = client
        .refresh_token(&credentials())
        .await
        .expect("token should be returned");
    assert_eq!(token, "tok-1");
}

#[tokio::test]
async fn refresh_token_surfaces_rejection_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid_grant"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let result = client.refresh_token(&credentials()).await;
    assert!(
        matches!(result, Err(AuthError::Rejected { status: 401 })),
        "expected Rejected(401), got: {result:?}"
    );
}

#[tokio::test]
async fn refresh_token_without_access_token_is_parse_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "error": "nope" })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let result = client.refresh_token(&credentials()).await;
    assert!(
        matches!(result, Err(AuthError::ParseFailure { .. })),
        "expected ParseFailure, got: {result:?}"
    );
}

#[tokio::test]
async fn refresh_token_unreachable_host_is_transport_error() {
    let client = test_client("http://127.0.0.1:1");
    let result = client.refresh_token(&credentials()).await;
    assert!(
        matches!(result, Err(AuthError::Transport(_))),
        "expected Transport, got: {result:?}"
    );
}

// ---------------------------------------------------------------------------
// Document submission
// ---------------------------------------------------------------------------

#[tokio::test]
async fn submit_document_sends_bearer_and_wire_json() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/palacete/Internos/"))
        .and(header("authorization", "Bearer tok-1"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "tipoDoc": "FT",
            "serie": "2024",
            "data": "2024-01-01",
            "linhas": [
                { "artigo": "A", "quantidade": 2 },
                { "artigo": "B", "quantidade": 1 }
            ]
        })))
        .respond_with(ResponseTemplate::new(201).set_body_string("{\"id\": 7}"))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let result = client.submit_document(&sample_document(), "tok-1").await;
    assert_eq!(result, SubmitResult::Accepted { status: 201 });
}

#[tokio::test]
async fn submit_document_payload_is_indented() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/palacete/Internos/"))
        .and(body_string_contains("\n  \"tipoDoc\": \"FT\""))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let result = client.submit_document(&sample_document(), "tok-1").await;
    assert!(result.is_accepted(), "got: {result:?}");
}

#[tokio::test]
async fn submit_document_reports_http_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/palacete/Internos/"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let result = client.submit_document(&sample_document(), "tok-1").await;
    assert_eq!(result, SubmitResult::HttpFailure { status: 500 });
    assert!(!result.is_accepted());
}

#[tokio::test]
async fn submit_document_reports_transport_failure() {
    let client = test_client("http://127.0.0.1:1");
    let result = client.submit_document(&sample_document(), "tok-1").await;
    assert!(
        matches!(result, SubmitResult::TransportFailure { .. }),
        "expected TransportFailure, got: {result:?}"
    );
}
