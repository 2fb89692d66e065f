// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.
//
// Covered:
// - GET /health
// - POST /api/entries (201, validation 400, malformed JSON)
// - GET /api/entries, GET /api/entries/{id} (200 + 404)
// - GET /api/pop, GET /api/queue
// - SPA fallback to index.html

use std::time::Duration;

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::json;
use serde_json::Value as Json;
use tower::ServiceExt as _; // for `oneshot`

use entry_board::{api, validate::Limits, AppState, Store, StoreOptions};

const BODY_LIMIT: usize = 1024 * 1024; // 1MB, safe for tests

struct TestApp {
    _dir: tempfile::TempDir,
    router: Router,
}

/// Build the same Router the binary uses, backed by a temp log + temp static dir.
fn test_app(pop_max_wait: Duration) -> TestApp {
    let dir = tempfile::tempdir().expect("tempdir");
    let static_dir = dir.path().join("static");
    std::fs::create_dir(&static_dir).expect("static dir");
    std::fs::write(static_dir.join("index.html"), "<h1>board</h1>").expect("index");

    let opts = StoreOptions::default()
        .with_file_path(dir.path().join("messages.json"))
        .with_pop_max_wait(pop_max_wait);
    let store = Store::open(opts).expect("open store");
    let router = api::router(AppState::new(store, Limits::default()), &static_dir);
    TestApp { _dir: dir, router }
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Vec<u8>) {
    let resp = app.clone().oneshot(req).await.expect("oneshot");
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    (status, bytes)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("build GET")
}

fn post_entry(payload: &Json) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/entries")
        .header("content-type", "application/json")
        .header("user-agent", "integration-test/1.0")
        .header("x-forwarded-for", "203.0.113.9, 10.0.0.1")
        .body(Body::from(payload.to_string()))
        .expect("build POST /api/entries")
}

#[tokio::test]
async fn api_health_returns_200_and_ok_body() {
    let app = test_app(Duration::ZERO);
    let (status, body) = send(&app.router, get("/health")).await;
    assert_eq!(status, StatusCode::OK, "health should be 200");
    assert_eq!(String::from_utf8(body).expect("utf8"), "ok");
}

#[tokio::test]
async fn api_post_saves_entry_with_provenance() {
    let app = test_app(Duration::ZERO);

    let (status, body) = send(
        &app.router,
        post_entry(&json!({ "author": "  Anna ", "content": "God jul!" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let v: Json = serde_json::from_slice(&body).expect("parse saved json");
    let id = v["id"].as_str().expect("id present");
    assert!(!id.is_empty());
    assert!(v["created"].as_str().is_some_and(|c| !c.is_empty()));
    assert_eq!(v["author"], "Anna");
    assert_eq!(v["ip_addr"], "203.0.113.9");
    assert_eq!(v["user_agent"], "integration-test/1.0");

    let (status, body) = send(&app.router, get(&format!("/api/entries/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    let fetched: Json = serde_json::from_slice(&body).expect("parse get json");
    assert_eq!(fetched, v, "GET must return what POST returned");

    let (status, body) = send(&app.router, get("/api/entries")).await;
    assert_eq!(status, StatusCode::OK);
    let all: Json = serde_json::from_slice(&body).expect("parse list json");
    assert_eq!(all.as_object().map(|m| m.len()), Some(1));
    assert!(all.get(id).is_some());
}

#[tokio::test]
async fn api_post_rejects_blank_and_oversized_fields() {
    let app = test_app(Duration::ZERO);

    let (status, body) = send(&app.router, post_entry(&json!({ "author": "x", "content": "   " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let v: Json = serde_json::from_slice(&body).expect("error json");
    assert_eq!(v["error"], "content is required");

    let long = "a".repeat(501);
    let (status, _) = send(&app.router, post_entry(&json!({ "author": "x", "content": long }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app.router, post_entry(&json!({ "content": "no author" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Nothing persisted.
    let (_, body) = send(&app.router, get("/api/entries")).await;
    assert_eq!(body, b"{}");
}

#[tokio::test]
async fn api_malformed_json_is_client_error() {
    let app = test_app(Duration::ZERO);
    let req = Request::builder()
        .method("POST")
        .uri("/api/entries")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .expect("build");
    let (status, _) = send(&app.router, req).await;
    assert!(status.is_client_error(), "got {status}");
}

#[tokio::test]
async fn api_unknown_entry_is_404() {
    let app = test_app(Duration::ZERO);
    let (status, body) = send(&app.router, get("/api/entries/does-not-exist")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let v: Json = serde_json::from_slice(&body).expect("error json");
    assert!(v["error"].as_str().is_some_and(|m| m.contains("does-not-exist")));
}

#[tokio::test]
async fn api_pop_returns_placeholder_then_queued_entries() {
    let app = test_app(Duration::ZERO);

    let (status, body) = send(&app.router, get("/api/pop")).await;
    assert_eq!(status, StatusCode::OK);
    let ph: Json = serde_json::from_slice(&body).expect("placeholder json");
    assert_eq!(ph["author"], "Tomten");
    assert!(ph["content"].as_str().is_some_and(|c| !c.is_empty()));
    assert!(ph.get("id").is_none(), "placeholder has no id");

    for (author, content) in [("a", "first"), ("b", "second")] {
        let (status, _) = send(&app.router, post_entry(&json!({ "author": author, "content": content }))).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, body) = send(&app.router, get("/api/queue")).await;
    let q: Json = serde_json::from_slice(&body).expect("queue json");
    assert_eq!(q.as_object().map(|m| m.len()), Some(2));

    let (_, b1) = send(&app.router, get("/api/pop")).await;
    let (_, b2) = send(&app.router, get("/api/pop")).await;
    let p1: Json = serde_json::from_slice(&b1).expect("pop 1");
    let p2: Json = serde_json::from_slice(&b2).expect("pop 2");
    assert_eq!(p1["content"], "first");
    assert_eq!(p2["content"], "second");

    let (_, body) = send(&app.router, get("/api/queue")).await;
    assert_eq!(body, b"{}");
}

#[tokio::test]
async fn api_pop_inside_window_repeats() {
    let app = test_app(Duration::from_secs(3600));
    for content in ["one", "two"] {
        send(&app.router, post_entry(&json!({ "author": "a", "content": content }))).await;
    }
    let (_, b1) = send(&app.router, get("/api/pop")).await;
    let (_, b2) = send(&app.router, get("/api/pop")).await;
    assert_eq!(b1, b2, "second pop inside the window must repeat the first");

    let (_, body) = send(&app.router, get("/api/queue")).await;
    let q: Json = serde_json::from_slice(&body).expect("queue json");
    assert_eq!(q.as_object().map(|m| m.len()), Some(1));
}

#[tokio::test]
async fn spa_routes_fall_back_to_index() {
    let app = test_app(Duration::ZERO);
    for uri in ["/", "/some/front-end/route"] {
        let (status, body) = send(&app.router, get(uri)).await;
        assert_eq!(status, StatusCode::OK, "uri {uri}");
        assert_eq!(String::from_utf8(body).expect("utf8"), "<h1>board</h1>");
    }
}
