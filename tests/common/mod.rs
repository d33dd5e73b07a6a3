#![allow(dead_code)]

use axum::extract::ConnectInfo;
use axum::http::HeaderName;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::mpsc;
use tower::Layer;

use linkgate::application::services::hash_token;
use linkgate::domain::click_event::ClickEvent;
use linkgate::domain::entities::{
    AbTest, AbTestStatus, CloakType, CloakingConfig, Link, LinkTarget, TargetKind, Variant,
};
use linkgate::domain::repositories::TokenRepository;
use linkgate::infrastructure::cache::NullCache;
use linkgate::infrastructure::geoip::NullGeoLookup;
use linkgate::infrastructure::memory::MemoryStore;
use linkgate::state::{AppState, Repositories, RequestSettings};

pub const SIGNING_SECRET: &str = "test-signing-secret";
pub const COUNTRY_HEADER: &str = "cf-ipcountry";

pub const IPHONE_UA: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";
pub const DESKTOP_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

pub fn create_test_state(store: &MemoryStore) -> (AppState, mpsc::Receiver<ClickEvent>) {
    let (tx, rx) = mpsc::channel(100);

    let repositories = Repositories {
        links: Arc::new(store.clone()),
        ab_tests: Arc::new(store.clone()),
        clicks: Arc::new(store.clone()),
        tokens: Arc::new(store.clone()),
    };
    let settings = RequestSettings {
        behind_proxy: false,
        geo_country_header: Some(HeaderName::from_static(COUNTRY_HEADER)),
    };

    let state = AppState::new(
        repositories,
        Arc::new(NullCache),
        Arc::new(NullGeoLookup),
        tx,
        SIGNING_SECRET.to_string(),
        settings,
    );

    (state, rx)
}

pub async fn create_test_link(store: &MemoryStore, code: &str, url: &str) -> Link {
    store.insert_link(Link::new(0, code, url)).await
}

pub async fn create_cloaked_link(
    store: &MemoryStore,
    code: &str,
    url: &str,
    kind: CloakType,
) -> Link {
    let mut link = Link::new(0, code, url);
    link.cloaking = Some(CloakingConfig {
        kind,
        title: Some("Summer Sale".to_string()),
        favicon: None,
    });
    store.insert_link(link).await
}

pub async fn create_test_target(
    store: &MemoryStore,
    link_id: i64,
    kind: TargetKind,
    value: &str,
    url: &str,
    priority: i32,
) -> LinkTarget {
    store
        .insert_target(LinkTarget {
            id: 0,
            link_id,
            kind,
            value: value.to_string(),
            destination_url: url.to_string(),
            priority,
            is_active: true,
        })
        .await
}

/// Stores a running test with one variant per `(name, url, weight)`.
pub async fn create_running_test(
    store: &MemoryStore,
    link_id: i64,
    variants: &[(&str, &str, i32)],
) -> AbTest {
    store
        .insert_ab_test(AbTest {
            id: 0,
            link_id,
            name: "landing-page".to_string(),
            status: AbTestStatus::Running,
            started_at: None,
            ended_at: None,
            variants: variants
                .iter()
                .map(|(name, url, weight)| Variant {
                    id: 0,
                    test_id: 0,
                    name: name.to_string(),
                    destination_url: url.to_string(),
                    weight: *weight,
                })
                .collect(),
        })
        .await
}

/// Stores an API token and returns the raw value to send as Bearer.
pub async fn create_test_token(store: &MemoryStore, name: &str) -> String {
    let raw = format!("raw-token-{}", name);
    store
        .create_token(name, &hash_token(SIGNING_SECRET, &raw))
        .await
        .unwrap();
    raw
}

#[derive(Clone)]
pub struct MockConnectInfoLayer;

impl<S> Layer<S> for MockConnectInfoLayer {
    type Service = MockConnectInfoService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MockConnectInfoService { inner }
    }
}

#[derive(Clone)]
pub struct MockConnectInfoService<S> {
    inner: S,
}

impl<S, B> tower::Service<axum::http::Request<B>> for MockConnectInfoService<S>
where
    S: tower::Service<axum::http::Request<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        let addr: SocketAddr = "127.0.0.1:12345".parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        self.inner.call(req)
    }
}
