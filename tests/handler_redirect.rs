mod common;

use axum::{Router, routing::get};
use axum_test::TestServer;
use chrono::{Duration, Utc};
use common::{COUNTRY_HEADER, DESKTOP_UA, IPHONE_UA, MockConnectInfoLayer};
use linkgate::api::handlers::{redirect_handler, resolve_handler};
use linkgate::domain::entities::{CloakType, Link, TargetKind};
use linkgate::infrastructure::memory::MemoryStore;
use linkgate::state::AppState;
use linkgate::utils::password::hash_password;

fn test_app(state: AppState) -> TestServer {
    let app = Router::new()
        .route("/{code}", get(redirect_handler))
        .route("/api/r/{code}", get(resolve_handler))
        .layer(MockConnectInfoLayer)
        .with_state(state);

    TestServer::new(app).unwrap()
}

#[tokio::test]
async fn test_resolve_success() {
    let store = MemoryStore::new();
    let (state, mut rx) = common::create_test_state(&store);
    let server = test_app(state);

    let link = common::create_test_link(&store, "abc123", "https://example.com/landing").await;

    let response = server.get("/api/r/abc123").await;

    response.assert_status_ok();
    assert_eq!(response.header("cache-control"), "private, no-store");
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["originalUrl"], "https://example.com/landing");

    let click = rx.try_recv().unwrap();
    assert_eq!(click.link_id, link.id);
    assert_eq!(click.ip.as_deref(), Some("127.0.0.1"));
}

#[tokio::test]
async fn test_resolve_by_custom_alias() {
    let store = MemoryStore::new();
    let (state, _rx) = common::create_test_state(&store);
    let server = test_app(state);

    let mut link = Link::new(0, "k3x9q", "https://example.com/alias");
    link.custom_alias = Some("spring-promo".to_string());
    store.insert_link(link).await;

    let response = server.get("/api/r/spring-promo").await;

    response.assert_status_ok();
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["originalUrl"], "https://example.com/alias");
}

#[tokio::test]
async fn test_resolve_not_found() {
    let store = MemoryStore::new();
    let (state, mut rx) = common::create_test_state(&store);
    let server = test_app(state);

    let response = server.get("/api/r/missing").await;

    response.assert_status_not_found();
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"], "Link not found");
    assert!(json.get("requiresPassword").is_none());
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_resolve_invalid_code_is_not_found() {
    let store = MemoryStore::new();
    let (state, _rx) = common::create_test_state(&store);
    let server = test_app(state);

    let response = server.get("/api/r/bad%20code").await;

    response.assert_status_not_found();
}

#[tokio::test]
async fn test_resolve_inactive_link_is_gone() {
    let store = MemoryStore::new();
    let (state, mut rx) = common::create_test_state(&store);
    let server = test_app(state);

    let mut link = Link::new(0, "abc123", "https://example.com");
    link.is_active = false;
    store.insert_link(link).await;

    let response = server.get("/api/r/abc123").await;

    response.assert_status(axum::http::StatusCode::GONE);
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"], "Link is no longer available");
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_resolve_expired_link_is_gone() {
    let store = MemoryStore::new();
    let (state, _rx) = common::create_test_state(&store);
    let server = test_app(state);

    let mut link = Link::new(0, "old", "https://example.com");
    link.expires_at = Some(Utc::now() - Duration::hours(1));
    store.insert_link(link).await;

    let response = server.get("/api/r/old").await;

    response.assert_status(axum::http::StatusCode::GONE);
}

#[tokio::test]
async fn test_resolve_password_required() {
    let store = MemoryStore::new();
    let (state, mut rx) = common::create_test_state(&store);
    let server = test_app(state);

    let mut link = Link::new(0, "secret", "https://example.com/private");
    link.password_hash = Some(hash_password("hunter2").unwrap());
    store.insert_link(link).await;

    let response = server.get("/api/r/secret").await;

    response.assert_status_unauthorized();
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"], "Password required");
    assert_eq!(json["requiresPassword"], true);
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_resolve_wrong_password() {
    let store = MemoryStore::new();
    let (state, _rx) = common::create_test_state(&store);
    let server = test_app(state);

    let mut link = Link::new(0, "secret", "https://example.com/private");
    link.password_hash = Some(hash_password("hunter2").unwrap());
    store.insert_link(link).await;

    let response = server
        .get("/api/r/secret")
        .add_header("x-link-password", "letmein")
        .await;

    response.assert_status_unauthorized();
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"], "Invalid password");
    assert!(json.get("requiresPassword").is_none());
}

#[tokio::test]
async fn test_resolve_correct_password() {
    let store = MemoryStore::new();
    let (state, mut rx) = common::create_test_state(&store);
    let server = test_app(state);

    let mut link = Link::new(0, "secret", "https://example.com/private");
    link.password_hash = Some(hash_password("hunter2").unwrap());
    store.insert_link(link).await;

    let response = server
        .get("/api/r/secret")
        .add_header("x-link-password", "hunter2")
        .await;

    response.assert_status_ok();
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["originalUrl"], "https://example.com/private");
    assert!(rx.try_recv().is_ok());
}

#[tokio::test]
async fn test_resolve_device_targeting() {
    let store = MemoryStore::new();
    let (state, _rx) = common::create_test_state(&store);
    let server = test_app(state);

    let link = common::create_test_link(&store, "xyz789", "https://example.com/default").await;
    common::create_test_target(
        &store,
        link.id,
        TargetKind::Device,
        "mobile",
        "https://m.example.com",
        1,
    )
    .await;

    let mobile = server
        .get("/api/r/xyz789")
        .add_header("user-agent", IPHONE_UA)
        .await;
    mobile.assert_status_ok();
    assert_eq!(
        mobile.json::<serde_json::Value>()["originalUrl"],
        "https://m.example.com"
    );

    let desktop = server
        .get("/api/r/xyz789")
        .add_header("user-agent", DESKTOP_UA)
        .await;
    desktop.assert_status_ok();
    assert_eq!(
        desktop.json::<serde_json::Value>()["originalUrl"],
        "https://example.com/default"
    );
}

#[tokio::test]
async fn test_resolve_geo_targeting_prefers_lower_priority_number() {
    let store = MemoryStore::new();
    let (state, _rx) = common::create_test_state(&store);
    let server = test_app(state);

    let link = common::create_test_link(&store, "world", "https://example.com").await;
    common::create_test_target(
        &store,
        link.id,
        TargetKind::Device,
        "mobile",
        "https://m.example.com",
        5,
    )
    .await;
    common::create_test_target(
        &store,
        link.id,
        TargetKind::Geo,
        "DE",
        "https://example.de",
        1,
    )
    .await;

    let response = server
        .get("/api/r/world")
        .add_header("user-agent", IPHONE_UA)
        .add_header(COUNTRY_HEADER, "de")
        .await;
    response.assert_status_ok();
    assert_eq!(
        response.json::<serde_json::Value>()["originalUrl"],
        "https://example.de"
    );

    let response = server
        .get("/api/r/world")
        .add_header("user-agent", IPHONE_UA)
        .add_header(COUNTRY_HEADER, "FR")
        .await;
    assert_eq!(
        response.json::<serde_json::Value>()["originalUrl"],
        "https://m.example.com"
    );
}

#[tokio::test]
async fn test_resolve_ab_test_is_sticky() {
    let store = MemoryStore::new();
    let (state, _rx) = common::create_test_state(&store);
    let server = test_app(state);

    let link = common::create_test_link(&store, "split", "https://example.com").await;
    common::create_running_test(
        &store,
        link.id,
        &[
            ("control", "https://example.com/a", 50),
            ("treatment", "https://example.com/b", 50),
        ],
    )
    .await;

    let mut seen = Vec::new();
    for _ in 0..5 {
        let response = server
            .get("/api/r/split")
            .add_header("user-agent", DESKTOP_UA)
            .await;
        response.assert_status_ok();
        seen.push(response.json::<serde_json::Value>()["originalUrl"].clone());
    }

    assert!(seen.iter().all(|url| *url == seen[0]));
    assert!(seen[0] == "https://example.com/a" || seen[0] == "https://example.com/b");
    assert_eq!(store.impressions().await.len(), 5);
}

#[tokio::test]
async fn test_resolve_ab_test_with_zero_weights_uses_default() {
    let store = MemoryStore::new();
    let (state, _rx) = common::create_test_state(&store);
    let server = test_app(state);

    let link = common::create_test_link(&store, "paused", "https://example.com/default").await;
    common::create_running_test(
        &store,
        link.id,
        &[
            ("control", "https://example.com/a", 0),
            ("treatment", "https://example.com/b", 0),
        ],
    )
    .await;

    let response = server.get("/api/r/paused").await;

    response.assert_status_ok();
    assert_eq!(
        response.json::<serde_json::Value>()["originalUrl"],
        "https://example.com/default"
    );
    assert!(store.impressions().await.is_empty());
}

#[tokio::test]
async fn test_resolve_cloaked_link_returns_html() {
    let store = MemoryStore::new();
    let (state, _rx) = common::create_test_state(&store);
    let server = test_app(state);

    common::create_cloaked_link(
        &store,
        "framed",
        "https://example.com/offer?a=1&b=2",
        CloakType::Iframe,
    )
    .await;

    let response = server.get("/api/r/framed").await;

    response.assert_status_ok();
    assert_eq!(response.header("content-type"), "text/html; charset=utf-8");
    assert_eq!(response.header("x-robots-tag"), "noindex, nofollow");
    assert_eq!(response.header("cache-control"), "private, no-store");

    let body = response.text();
    assert!(body.contains("<iframe"));
    assert!(body.contains("https://example.com/offer?a=1&amp;b=2"));
    assert!(body.contains("<title>Summer Sale</title>"));
    assert!(body.contains("noindex"));
}

#[tokio::test]
async fn test_resolve_javascript_cloak_escapes_destination() {
    let store = MemoryStore::new();
    let (state, _rx) = common::create_test_state(&store);
    let server = test_app(state);

    common::create_cloaked_link(
        &store,
        "jsgo",
        "https://example.com/?q=</script><script>alert(1)</script>",
        CloakType::Javascript,
    )
    .await;

    let response = server.get("/api/r/jsgo").await;

    response.assert_status_ok();
    let body = response.text();
    assert!(!body.contains("<script>alert(1)"));
    assert!(body.contains("window.location.replace("));
    assert!(body.contains("\\u003c/script\\u003e"));
}

#[tokio::test]
async fn test_resolve_meta_refresh_cloak() {
    let store = MemoryStore::new();
    let (state, _rx) = common::create_test_state(&store);
    let server = test_app(state);

    common::create_cloaked_link(
        &store,
        "meta",
        "https://example.com/next",
        CloakType::MetaRefresh,
    )
    .await;

    let response = server.get("/api/r/meta").await;

    response.assert_status_ok();
    let body = response.text();
    assert!(body.contains("http-equiv=\"refresh\""));
    assert!(body.contains("0;url=https://example.com/next"));
}

#[tokio::test]
async fn test_browser_redirect() {
    let store = MemoryStore::new();
    let (state, mut rx) = common::create_test_state(&store);
    let server = test_app(state);

    common::create_test_link(&store, "abc123", "https://example.com/target").await;

    let response = server.get("/abc123").await;

    assert_eq!(response.status_code(), 307);
    assert_eq!(response.header("location"), "https://example.com/target");
    assert!(rx.try_recv().is_ok());
}

#[tokio::test]
async fn test_browser_redirect_gone_uses_json_error() {
    let store = MemoryStore::new();
    let (state, _rx) = common::create_test_state(&store);
    let server = test_app(state);

    let mut link = Link::new(0, "abc123", "https://example.com");
    link.is_active = false;
    store.insert_link(link).await;

    let response = server.get("/abc123").await;

    response.assert_status(axum::http::StatusCode::GONE);
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"], "Link is no longer available");
}
