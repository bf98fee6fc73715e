#![allow(clippy::unwrap_used)]

use mockito::{Matcher, Server};
use reqwest::Method;
use serde_json::{json, Value};
use std::net::TcpListener;
use std::sync::Arc;
use std::time::{Duration, Instant};
use zeeremind_cli::api::client::data;
use zeeremind_cli::api::{ApiClient, MemoryTokenStore, RequestError, RequestOptions, TokenStore};
use zeeremind_cli::ClientConfig;

fn config(url: &str) -> ClientConfig {
    ClientConfig {
        api_url: url.to_string(),
        timeout_ms: 5_000,
        retry_base_delay_ms: 1,
        ..ClientConfig::default()
    }
}

fn client_with(url: &str, tokens: Arc<MemoryTokenStore>) -> ApiClient {
    ApiClient::new(config(url), tokens).unwrap()
}

#[test]
fn get_retries_server_errors_then_gives_up() {
    let mut server = Server::new();
    let mock = server
        .mock("GET", "/subscription/plans")
        .with_status(500)
        .with_body(r#"{"success":false,"error":"boom"}"#)
        .expect(3)
        .create();

    let client = client_with(&server.url(), Arc::new(MemoryTokenStore::new()));
    let err = client
        .request("/subscription/plans", RequestOptions::get())
        .unwrap_err();

    mock.assert();
    assert_eq!(
        err,
        RequestError::Api {
            status: 500,
            code: None,
            message: "boom".to_string()
        }
    );
}

#[test]
fn retry_waits_grow_linearly() {
    let mut server = Server::new();
    let mock = server
        .mock("GET", "/slow")
        .with_status(503)
        .expect(3)
        .create();

    let cfg = ClientConfig {
        retry_base_delay_ms: 50,
        ..config(&server.url())
    };
    let client = ApiClient::new(cfg, Arc::new(MemoryTokenStore::new())).unwrap();

    let start = Instant::now();
    let _ = client.request("/slow", RequestOptions::get());
    // 50ms before retry 1, 100ms before retry 2
    assert!(start.elapsed() >= Duration::from_millis(150));
    mock.assert();
}

#[test]
fn post_is_not_retried_by_default() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", "/invoice-reminder/invoices")
        .with_status(503)
        .expect(1)
        .create();

    let client = client_with(&server.url(), Arc::new(MemoryTokenStore::new()));
    let err = client
        .request(
            "/invoice-reminder/invoices",
            RequestOptions::new(Method::POST).body(json!({"clientName": "Acme"})),
        )
        .unwrap_err();

    mock.assert();
    assert!(err.is_retryable());
}

#[test]
fn explicit_retries_apply_to_any_method() {
    let mut server = Server::new();
    let mock = server
        .mock("PUT", "/x")
        .with_status(502)
        .expect(2)
        .create();

    let client = client_with(&server.url(), Arc::new(MemoryTokenStore::new()));
    let _ = client.request("/x", RequestOptions::new(Method::PUT).retries(1));
    mock.assert();
}

#[test]
fn client_errors_are_not_retried() {
    let mut server = Server::new();
    let mock = server
        .mock("GET", "/invoice-reminder/invoices/missing")
        .with_status(404)
        .with_body(r#"{"success":false,"message":"Invoice not found"}"#)
        .expect(1)
        .create();

    let client = client_with(&server.url(), Arc::new(MemoryTokenStore::new()));
    let err = client
        .request("/invoice-reminder/invoices/missing", RequestOptions::get())
        .unwrap_err();

    mock.assert();
    assert_eq!(err.to_string(), "Invoice not found");
}

#[test]
fn unauthorized_clears_token_and_reports_expiry() {
    let mut server = Server::new();
    let mock = server
        .mock("GET", "/auth/me")
        .with_status(401)
        .with_body(r#"{"success":false,"error":"Not authorized"}"#)
        .expect(1)
        .create();

    let tokens = Arc::new(MemoryTokenStore::with_token("stale"));
    let client = client_with(&server.url(), Arc::clone(&tokens));
    let err = client.get_authed("/auth/me").unwrap_err();

    mock.assert();
    assert_eq!(err, RequestError::AuthExpired);
    assert!(err.is_auth());
    assert_eq!(tokens.load(), None);
}

#[test]
fn unauthorized_without_session_keeps_token() {
    let mut server = Server::new();
    server
        .mock("GET", "/subscription/plans")
        .with_status(401)
        .with_body(r#"{"success":false,"error":"Nope"}"#)
        .create();

    let tokens = Arc::new(MemoryTokenStore::with_token("keep-me"));
    let client = client_with(&server.url(), Arc::clone(&tokens));
    let err = client
        .request("/subscription/plans", RequestOptions::get())
        .unwrap_err();

    assert_eq!(
        err,
        RequestError::Api {
            status: 401,
            code: None,
            message: "Nope".to_string()
        }
    );
    assert_eq!(tokens.load().as_deref(), Some("keep-me"));
}

#[test]
fn limit_reached_code_is_structured() {
    let mut server = Server::new();
    server
        .mock("POST", "/invoice-reminder/invoices")
        .with_status(403)
        .with_body(
            r#"{"success":false,"code":"LIMIT_REACHED","message":"You have reached your invoice limit"}"#,
        )
        .create();

    let client = client_with(&server.url(), Arc::new(MemoryTokenStore::with_token("t")));
    let err = client
        .send_authed(Method::POST, "/invoice-reminder/invoices", Some(json!({})))
        .unwrap_err();

    assert!(err.is_limit_reached());
    assert_eq!(err.code(), Some("LIMIT_REACHED"));
    assert_eq!(err.to_string(), "You have reached your invoice limit");
}

#[test]
fn limit_wording_without_code_is_not_limit_reached() {
    let mut server = Server::new();
    server
        .mock("POST", "/invoice-reminder/invoices")
        .with_status(403)
        .with_body(r#"{"success":false,"message":"invoice limit reached"}"#)
        .create();

    let client = client_with(&server.url(), Arc::new(MemoryTokenStore::with_token("t")));
    let err = client
        .send_authed(Method::POST, "/invoice-reminder/invoices", None)
        .unwrap_err();

    assert!(!err.is_limit_reached());
}

#[test]
fn sends_bearer_token_and_json_content_type() {
    let mut server = Server::new();
    let mock = server
        .mock("GET", "/invoice-reminder/stats")
        .match_header("authorization", "Bearer secret-token")
        .match_header("content-type", "application/json")
        .with_status(200)
        .with_body(r#"{"success":true,"data":{"totalUnpaid":2,"overdueAmount":150.5,"paidThisMonth":1}}"#)
        .create();

    let client = client_with(&server.url(), Arc::new(MemoryTokenStore::with_token("secret-token")));
    let body = client.get_authed("/invoice-reminder/stats").unwrap();

    mock.assert();
    let stats: Value = data(body).unwrap();
    assert_eq!(stats["totalUnpaid"], 2);
}

#[test]
fn extra_headers_are_sent() {
    let mut server = Server::new();
    let mock = server
        .mock("GET", "/h")
        .match_header("x-request-source", "cli")
        .with_status(200)
        .with_body("{}")
        .create();

    let client = client_with(&server.url(), Arc::new(MemoryTokenStore::new()));
    client
        .request("/h", RequestOptions::get().header("x-request-source", "cli"))
        .unwrap();
    mock.assert();
}

#[test]
fn json_body_is_sent() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", "/auth/login")
        .match_body(Matcher::PartialJson(json!({"email": "a@b.co"})))
        .with_status(200)
        .with_body(r#"{"success":true,"token":"t"}"#)
        .create();

    let client = client_with(&server.url(), Arc::new(MemoryTokenStore::new()));
    client
        .request(
            "/auth/login",
            RequestOptions::new(Method::POST).body(json!({"email": "a@b.co", "password": "pw"})),
        )
        .unwrap();
    mock.assert();
}

#[test]
fn missing_token_fails_without_network() {
    let mut server = Server::new();
    let mock = server.mock("GET", Matcher::Any).expect(0).create();

    let client = client_with(&server.url(), Arc::new(MemoryTokenStore::new()));
    let err = client.get_authed("/auth/me").unwrap_err();

    mock.assert();
    assert_eq!(err, RequestError::NotAuthenticated);
}

#[test]
fn empty_success_body_is_null() {
    let mut server = Server::new();
    server.mock("DELETE", "/thing").with_status(204).create();

    let client = client_with(&server.url(), Arc::new(MemoryTokenStore::new()));
    let body = client
        .request("/thing", RequestOptions::new(Method::DELETE))
        .unwrap();
    assert_eq!(body, Value::Null);
}

#[test]
fn malformed_success_body_is_decode_error() {
    let mut server = Server::new();
    server
        .mock("GET", "/broken")
        .with_status(200)
        .with_body("<html>not json</html>")
        .create();

    let client = client_with(&server.url(), Arc::new(MemoryTokenStore::new()));
    let err = client.request("/broken", RequestOptions::get()).unwrap_err();
    assert!(matches!(err, RequestError::Decode(_)));
}

#[test]
fn non_json_error_body_uses_fallback_message() {
    let mut server = Server::new();
    server
        .mock("GET", "/gone")
        .with_status(410)
        .with_body("Gone")
        .create();

    let client = client_with(&server.url(), Arc::new(MemoryTokenStore::new()));
    let err = client.request("/gone", RequestOptions::get()).unwrap_err();
    assert_eq!(err.to_string(), "API Request Failed");
}

#[test]
fn stalled_server_times_out() {
    // Accepted by the kernel backlog but never answered.
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());

    let client = client_with(&url, Arc::new(MemoryTokenStore::new()));
    let err = client
        .request(
            "/subscription/status",
            RequestOptions::get().timeout(Duration::from_millis(200)),
        )
        .unwrap_err();

    assert_eq!(err, RequestError::Timeout);
    assert!(!err.is_retryable());
    drop(listener);
}

#[test]
fn refused_connection_is_network_error() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let url = format!("http://127.0.0.1:{}", port);

    let client = client_with(&url, Arc::new(MemoryTokenStore::new()));
    let err = client.request("/x", RequestOptions::get()).unwrap_err();
    assert!(matches!(err, RequestError::Network(_)));
}
