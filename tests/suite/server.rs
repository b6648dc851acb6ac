//! Full pipeline tests against a real server.
//!
//! These tests start a server with the fixture controller mounted, send raw
//! TCP traffic, and assert on status lines and envelope bodies.

use std::net::SocketAddr;
use std::sync::Arc;

use gangway::config::Auth;
use gangway::{Application, auth, server};
use serde_json::{Value, json};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use super::fixture::{Items, SECRET, test_config};

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

async fn start_test_server() -> (server::Server, Arc<Items>) {
    let items = Arc::new(Items::default());
    let mut app = Application::new(test_config());
    app.mount_shared(Arc::clone(&items))
        .expect("failed to mount fixture controller");
    let server = app.start().await.expect("failed to start test server");
    (server, items)
}

fn bearer() -> String {
    bearer_with_role(0)
}

fn bearer_with_role(role: u32) -> String {
    let config = Auth {
        jwt_secret: SECRET.to_string(),
        token_expiry_days: 1,
    };
    let token = auth::create_token_with_role(&config, "user-7", role).unwrap();
    format!("Authorization: Bearer {token}\r\n")
}

/// Send a raw HTTP/1.1 request with `Connection: close` and read the full response.
async fn raw_request(addr: SocketAddr, payload: &[u8]) -> String {
    let mut stream = TcpStream::connect(addr).await.expect("failed to connect");
    stream.write_all(payload).await.expect("failed to write");

    let mut buf = Vec::new();
    let _ = tokio::time::timeout(
        std::time::Duration::from_secs(5),
        stream.read_to_end(&mut buf),
    )
    .await;
    String::from_utf8_lossy(&buf).into_owned()
}

/// Build a request; `extra` holds additional header lines.
fn build(method: &str, path: &str, extra: &str, body: &str) -> Vec<u8> {
    format!(
        "{method} {path} HTTP/1.1\r\nHost: localhost\r\n{extra}Content-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    )
    .into_bytes()
}

fn status_of(response: &str) -> u16 {
    response
        .split_whitespace()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| panic!("no status line in:\n{response}"))
}

fn body_of(response: &str) -> Value {
    let (_, body) = response
        .split_once("\r\n\r\n")
        .unwrap_or_else(|| panic!("no body in:\n{response}"));
    serde_json::from_str(body).unwrap_or_else(|e| panic!("invalid JSON body ({e}):\n{body}"))
}

fn header_of<'a>(response: &'a str, name: &str) -> Option<&'a str> {
    response.lines().find_map(|line| {
        let (key, value) = line.split_once(':')?;
        key.eq_ignore_ascii_case(name).then(|| value.trim())
    })
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

#[tokio::test]
async fn query_parameter_reaches_handler_in_success_envelope() {
    let (server, _) = start_test_server().await;
    let response = raw_request(server.addr(), &build("GET", "/api/items?q=pen", "", "")).await;
    server.shutdown().await.unwrap();

    assert_eq!(status_of(&response), 200, "{response}");
    let body = body_of(&response);
    assert_eq!(body["code"], 1000);
    assert_eq!(body["message"], "Success.");
    assert_eq!(body["data"], json!({ "q": "pen" }));
    assert_eq!(
        body["requestId"].as_str(),
        header_of(&response, "x-request-id"),
        "envelope requestId must match the X-Request-Id header"
    );
}

#[tokio::test]
async fn absent_query_parameter_is_null() {
    let (server, _) = start_test_server().await;
    let response = raw_request(server.addr(), &build("GET", "/api/items", "", "")).await;
    server.shutdown().await.unwrap();

    assert_eq!(body_of(&response)["data"], json!({ "q": null }));
}

#[tokio::test]
async fn handler_error_is_forwarded() {
    let (server, _) = start_test_server().await;
    let response = raw_request(server.addr(), &build("GET", "/api/locked", "", "")).await;
    server.shutdown().await.unwrap();

    assert_eq!(status_of(&response), 400);
    assert_eq!(
        body_of(&response),
        json!({ "code": 4040, "message": "Item is locked" })
    );
}

#[tokio::test]
async fn client_request_id_is_propagated() {
    let (server, _) = start_test_server().await;
    let client_id = "550e8400-e29b-41d4-a716-446655440000";
    let extra = format!("X-Request-Id: {client_id}\r\n");
    let response = raw_request(server.addr(), &build("GET", "/api/items", &extra, "")).await;
    server.shutdown().await.unwrap();

    assert_eq!(body_of(&response)["requestId"], client_id);
}

// ---------------------------------------------------------------------------
// Authorization
// ---------------------------------------------------------------------------

#[tokio::test]
async fn protected_routes_reject_missing_session_for_every_verb() {
    let (server, items) = start_test_server().await;
    let addr = server.addr();

    for method in ["POST", "PUT", "DELETE"] {
        let response = raw_request(addr, &build(method, "/api/items", "", "{}")).await;
        assert_eq!(status_of(&response), 401, "{method}: {response}");
        assert_eq!(body_of(&response)["code"], 1001);
    }

    server.shutdown().await.unwrap();
    assert_eq!(items.calls(), 0, "handler must never run without a session");
}

#[tokio::test]
async fn session_and_body_resolve_in_position() {
    let (server, _) = start_test_server().await;
    let response = raw_request(
        server.addr(),
        &build("POST", "/api/items", &bearer(), r#"{"name":"pen"}"#),
    )
    .await;
    server.shutdown().await.unwrap();

    assert_eq!(status_of(&response), 200, "{response}");
    assert_eq!(
        body_of(&response)["data"],
        json!({ "owner": "user-7", "item": { "name": "pen" } })
    );
}

#[tokio::test]
async fn delete_is_routed_as_delete() {
    let (server, items) = start_test_server().await;
    let addr = server.addr();

    let removed = raw_request(addr, &build("DELETE", "/api/items", &bearer(), "")).await;
    let replaced = raw_request(addr, &build("PUT", "/api/items", &bearer(), r#"[1]"#)).await;
    server.shutdown().await.unwrap();

    assert_eq!(body_of(&removed)["data"], json!({ "removed": true }));
    assert_eq!(body_of(&replaced)["data"], json!([1]));
    assert_eq!(items.calls(), 2);
}

#[tokio::test]
async fn invalid_token_is_unauthorized() {
    let (server, items) = start_test_server().await;
    let response = raw_request(
        server.addr(),
        &build("PUT", "/api/items", "Authorization: Bearer not.a.jwt\r\n", "{}"),
    )
    .await;
    server.shutdown().await.unwrap();

    assert_eq!(status_of(&response), 401);
    assert_eq!(items.calls(), 0);
}

#[tokio::test]
async fn role_level_is_enforced() {
    let (server, items) = start_test_server().await;
    let addr = server.addr();

    let purge = |role| build("DELETE", "/api/admin/items", &bearer_with_role(role), "");
    let low = raw_request(addr, &purge(4)).await;
    let high = raw_request(addr, &purge(5)).await;
    server.shutdown().await.unwrap();

    assert_eq!(status_of(&low), 403, "{low}");
    assert_eq!(body_of(&low)["code"], 1003);
    assert_eq!(status_of(&high), 200, "{high}");
    assert_eq!(body_of(&high)["data"], json!({ "purged": true }));
    assert_eq!(items.calls(), 1);
}

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

#[tokio::test]
async fn malformed_body_is_bad_request() {
    let (server, items) = start_test_server().await;
    let response = raw_request(
        server.addr(),
        &build("POST", "/api/items", &bearer(), "not json"),
    )
    .await;
    server.shutdown().await.unwrap();

    assert_eq!(status_of(&response), 400);
    assert_eq!(body_of(&response)["code"], 1004);
    assert_eq!(items.calls(), 0);
}

#[tokio::test]
async fn unknown_path_and_method_use_error_shape() {
    let (server, _) = start_test_server().await;
    let addr = server.addr();
    let missing = raw_request(addr, &build("GET", "/api/nothing", "", "")).await;
    let wrong_verb = raw_request(addr, &build("DELETE", "/api/locked", "", "")).await;
    server.shutdown().await.unwrap();

    assert_eq!(status_of(&missing), 404);
    assert_eq!(body_of(&missing)["code"], 1005);
    assert_eq!(status_of(&wrong_verb), 405);
    assert_eq!(body_of(&wrong_verb)["code"], 1007);
}

/// Sends headers declaring a 10 MB Content-Length; the server rejects based
/// on the header alone.
#[tokio::test]
async fn server_rejects_oversized_body() {
    let (server, _) = start_test_server().await;
    let response = raw_request(
        server.addr(),
        b"POST /api/items HTTP/1.1\r\nHost: localhost\r\nContent-Length: 10485760\r\nConnection: close\r\n\r\n",
    )
    .await;
    server.shutdown().await.unwrap();

    assert_eq!(status_of(&response), 413, "{response}");
}

#[tokio::test]
async fn server_returns_security_headers() {
    let (server, _) = start_test_server().await;
    let response = raw_request(server.addr(), &build("GET", "/api/items", "", "")).await;
    server.shutdown().await.unwrap();

    assert_eq!(header_of(&response, "x-content-type-options"), Some("nosniff"));
    assert_eq!(header_of(&response, "x-frame-options"), Some("DENY"));
}
