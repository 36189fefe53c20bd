//! Integration tests for the JSON request client.

use std::time::Duration;

use pharmacy_core::{ApiError, Config, RequestClient, RequestOptions, SessionContext};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn client_with_token(server: &MockServer, token: Option<&str>) -> RequestClient {
    let session = SessionContext::in_memory();
    if let Some(token) = token {
        session.establish(None, Some(token.to_string())).await.unwrap();
    }
    RequestClient::new(&server.uri(), session).unwrap()
}

#[tokio::test]
async fn test_returns_parsed_json_unmodified() {
    let server = MockServer::start().await;
    let body = json!({"medicines": [{"id": 1, "name": "Ibuprofen", "stock": 40}], "total": 1});

    Mock::given(method("GET"))
        .and(path("/medicines"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let api = client_with_token(&server, None).await;
    let value = api.request("medicines", RequestOptions::default()).await.unwrap();
    assert_eq!(value, body);
}

#[tokio::test]
async fn test_malformed_body_is_reported_with_snippet() {
    let server = MockServer::start().await;
    let html = format!("<html><body>Fatal error: {}</body></html>", "x".repeat(300));

    Mock::given(method("GET"))
        .and(path("/sales"))
        .respond_with(ResponseTemplate::new(200).set_body_string(html.clone()))
        .mount(&server)
        .await;

    let api = client_with_token(&server, None).await;
    match api.request("sales", RequestOptions::get()).await {
        Err(ApiError::MalformedResponse { snippet }) => {
            assert_eq!(snippet.chars().count(), 100);
            assert!(html.starts_with(&snippet));
        }
        other => panic!("expected MalformedResponse, got {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_error_page_is_still_malformed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/reports"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&server)
        .await;

    let api = client_with_token(&server, None).await;
    let err = api.request("reports", RequestOptions::get()).await.unwrap_err();
    assert!(matches!(err, ApiError::MalformedResponse { .. }));
}

#[tokio::test]
async fn test_error_status_uses_backend_message() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/users/9"))
        .respond_with(
            ResponseTemplate::new(403)
                .set_body_json(json!({"success": false, "message": "Only admins can delete users"})),
        )
        .mount(&server)
        .await;

    let api = client_with_token(&server, Some("tok")).await;
    match api.request("users/9", RequestOptions::delete()).await {
        Err(ApiError::RequestFailed { status, message }) => {
            assert_eq!(status, Some(403));
            assert_eq!(message, "Only admins can delete users");
        }
        other => panic!("expected RequestFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_error_status_without_message_falls_back() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/inventory"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({"success": false})))
        .mount(&server)
        .await;

    let api = client_with_token(&server, None).await;
    let err = api.request("inventory", RequestOptions::get()).await.unwrap_err();
    assert_eq!(err.status(), Some(503));
    assert_eq!(err.to_string(), "HTTP 503 Service Unavailable");
}

#[tokio::test]
async fn test_mutating_requests_carry_csrf_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/medicines"))
        .and(header("x-csrf-token", "abc"))
        .and(body_json(json!({"name": "Cetirizine", "stock": 12})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"success": true, "id": 14})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/medicines"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let api = client_with_token(&server, Some("abc")).await;

    let options = RequestOptions::post()
        .with_json(&json!({"name": "Cetirizine", "stock": 12}))
        .unwrap();
    let created = api.request("medicines", options).await.unwrap();
    assert_eq!(created["id"], 14);

    api.request("medicines", RequestOptions::get()).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let get = requests
        .iter()
        .find(|r| r.method.as_str() == "GET")
        .expect("GET request missing");
    assert!(get.headers.get("x-csrf-token").is_none());
}

#[tokio::test]
async fn test_no_csrf_header_without_token() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/settings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .mount(&server)
        .await;

    let api = client_with_token(&server, None).await;
    api.request("settings", RequestOptions::put()).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].headers.get("x-csrf-token").is_none());
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    // Nothing listens on port 1
    let api = RequestClient::new("http://127.0.0.1:1/api", SessionContext::in_memory()).unwrap();
    let err = api.request("medicines", RequestOptions::get()).await.unwrap_err();
    assert!(matches!(err, ApiError::Network(_)));
    assert!(err.to_string().starts_with("Network error"));
}

#[tokio::test]
async fn test_check_session_returns_backend_answer() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/session_status"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"logged_in": true, "role": "cashier"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let api = client_with_token(&server, Some("tok")).await;
    let status = api.check_session().await.unwrap();
    assert_eq!(status["logged_in"], true);

    // GET: no token
    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("x-csrf-token").is_none());
}

#[tokio::test]
async fn test_session_cookie_is_sent_back() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ping"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Set-Cookie", "PHPSESSID=s3ss10n; Path=/")
                .set_body_json(json!({"ok": true})),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/session_status"))
        .and(header("cookie", "PHPSESSID=s3ss10n"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"logged_in": true})))
        .expect(1)
        .mount(&server)
        .await;

    let api = client_with_token(&server, None).await;
    api.request("ping", RequestOptions::get()).await.unwrap();
    let status = api.check_session().await.unwrap();
    assert_eq!(status["logged_in"], true);
}

#[tokio::test]
async fn test_typed_helpers() {
    #[derive(serde::Deserialize)]
    struct Medicine {
        name: String,
    }

    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/medicines/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "Metformin"})))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/medicines/4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 4})))
        .mount(&server)
        .await;

    let api = client_with_token(&server, None).await;
    let medicine: Medicine = api.get_json("medicines/3").await.unwrap();
    assert_eq!(medicine.name, "Metformin");

    // Shape mismatch is malformed
    let err = api.get_json::<Medicine>("medicines/4").await.err().unwrap();
    assert!(matches!(err, ApiError::MalformedResponse { .. }));
}

#[tokio::test]
async fn test_configured_timeout_is_network_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/session_status"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"logged_in": true}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let config = Config {
        api_base_url: server.uri(),
        request_timeout_secs: Some(1),
        ..Config::default()
    };
    let api = RequestClient::from_config(&config, SessionContext::in_memory()).unwrap();

    match api.check_session().await {
        Err(ApiError::Network(e)) => assert!(e.is_timeout()),
        other => panic!("expected timeout, got {other:?}"),
    }
}
