//! Handler for per-link statistics.

use axum::{
    Json,
    extract::{Path, Query, State},
};

use crate::api::dto::stats::{StatsQuery, StatsResponse};
use crate::error::AppError;
use crate::state::AppState;

/// Returns click totals and A/B test results for a link.
///
/// # Endpoint
///
/// `GET /api/stats/{code}` (Bearer token required)
///
/// # Query Parameters
///
/// - `from` (optional): Start date (RFC 3339)
/// - `to` (optional): End date (RFC 3339)
///
/// # Errors
///
/// Returns 404 Not Found if the code or alias doesn't exist.
/// Returns 400 Bad Request if `from` is after `to`.
pub async fn stats_handler(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Query(params): Query<StatsQuery>,
) -> Result<Json<StatsResponse>, AppError> {
    let report = state
        .stats_service
        .link_report(&code, params.from, params.to)
        .await?;

    Ok(Json(report.into()))
}
