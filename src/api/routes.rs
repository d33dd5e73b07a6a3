//! API route configuration.

use crate::api::handlers::{resolve_handler, stats_handler};
use crate::state::AppState;
use axum::{Router, routing::get};

/// Public resolution routes.
///
/// # Endpoints
///
/// - `GET /api/r/{code}` - Resolve a short code to its destination
pub fn public_routes() -> Router<AppState> {
    Router::new().route("/api/r/{code}", get(resolve_handler))
}

/// Routes protected by Bearer token authentication, nested under `/api`.
///
/// # Endpoints
///
/// - `GET /stats/{code}` - Click totals and A/B test results for a link
pub fn protected_routes() -> Router<AppState> {
    Router::new().route("/stats/{code}", get(stats_handler))
}
