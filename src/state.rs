//! Shared application state injected into every handler.

use axum::http::HeaderName;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::application::services::{
    AuthService, ClickTracker, RedirectService, StatsService, TargetResolver, VariantSelector,
};
use crate::domain::click_event::ClickEvent;
use crate::domain::repositories::{
    AbTestRepository, ClickRepository, LinkRepository, TokenRepository,
};
use crate::infrastructure::cache::CacheService;
use crate::infrastructure::geoip::GeoLookup;

/// The repository implementations the services are built on.
#[derive(Clone)]
pub struct Repositories {
    pub links: Arc<dyn LinkRepository>,
    pub ab_tests: Arc<dyn AbTestRepository>,
    pub clicks: Arc<dyn ClickRepository>,
    pub tokens: Arc<dyn TokenRepository>,
}

/// How request metadata is read from incoming requests.
#[derive(Debug, Clone, Default)]
pub struct RequestSettings {
    /// Trust `X-Forwarded-For` / `X-Real-IP` for the client address.
    pub behind_proxy: bool,
    /// Header carrying an edge-provided country code.
    pub geo_country_header: Option<HeaderName>,
}

#[derive(Clone)]
pub struct AppState {
    pub redirect_service: Arc<RedirectService>,
    pub stats_service: Arc<StatsService>,
    pub auth_service: Arc<AuthService>,
    pub links: Arc<dyn LinkRepository>,
    pub cache: Arc<dyn CacheService>,
    pub click_tracker: ClickTracker,
    pub settings: RequestSettings,
}

impl AppState {
    /// Wires the services together.
    ///
    /// `click_sender` is the producer side of the queue drained by
    /// [`crate::domain::click_worker::run_click_worker`].
    pub fn new(
        repositories: Repositories,
        cache: Arc<dyn CacheService>,
        geo: Arc<dyn GeoLookup>,
        click_sender: mpsc::Sender<ClickEvent>,
        token_signing_secret: String,
        settings: RequestSettings,
    ) -> Self {
        let click_tracker = ClickTracker::new(click_sender);

        let redirect_service = Arc::new(RedirectService::new(
            repositories.links.clone(),
            cache.clone(),
            click_tracker.clone(),
            VariantSelector::new(repositories.ab_tests.clone()),
            TargetResolver::new(geo),
        ));
        let stats_service = Arc::new(StatsService::new(
            repositories.links.clone(),
            repositories.clicks.clone(),
            repositories.ab_tests.clone(),
        ));
        let auth_service = Arc::new(AuthService::new(
            repositories.tokens.clone(),
            token_signing_secret,
        ));

        Self {
            redirect_service,
            stats_service,
            auth_service,
            links: repositories.links,
            cache,
            click_tracker,
            settings,
        }
    }
}
