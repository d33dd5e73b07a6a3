//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /{code}`         - Browser redirect (public)
//! - `GET  /health`         - Health check: DB, cache, click queue (public)
//! - `GET  /api/r/{code}`   - Resolve a short code to JSON or a cloaked page (public)
//! - `GET  /api/stats/{code}` - Link statistics (Bearer token required)
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Rate limiting** - Per-IP token bucket (forwarded IP behind a proxy)
//! - **Authentication** - Bearer token on `/api/stats`
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::{health_handler, redirect_handler};
use crate::api::middleware::{auth, rate_limit, tracing};
use crate::state::AppState;
use axum::routing::get;
use axum::{Router, middleware};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Constructs the application router with all routes and middleware.
///
/// When `state.settings.behind_proxy` is set, rate limiting keys on the
/// forwarded client address instead of the peer socket address.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    let protected = api::routes::protected_routes()
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer));

    let public = Router::new()
        .route("/{code}", get(redirect_handler))
        .merge(api::routes::public_routes());

    let (public, protected) = if state.settings.behind_proxy {
        (
            public.layer(rate_limit::proxied_layer()),
            protected.layer(rate_limit::proxied_secure_layer()),
        )
    } else {
        (
            public.layer(rate_limit::layer()),
            protected.layer(rate_limit::secure_layer()),
        )
    };

    let router = Router::new()
        .route("/health", get(health_handler))
        .merge(public)
        .nest("/api", protected)
        .with_state(state)
        .layer(tracing::layer());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}
