//! Handlers for short link resolution.

use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderName, header},
    response::{IntoResponse, Redirect, Response},
};

use crate::api::dto::redirect::ResolveResponse;
use crate::api::extract::Visitor;
use crate::error::RedirectError;
use crate::state::AppState;
use crate::web::cloaking::cloaked_page_content_type;

const NO_STORE: &str = "private, no-store";
const X_ROBOTS_TAG: HeaderName = HeaderName::from_static("x-robots-tag");

/// Resolves a short code and returns its destination as JSON.
///
/// # Endpoint
///
/// `GET /api/r/{code}`
///
/// # Headers
///
/// - `x-link-password` - password of a protected link
///
/// # Response
///
/// - `200 {"originalUrl": "..."}`
/// - `200 text/html` with `X-Robots-Tag: noindex, nofollow` for cloaked links
/// - `401 {"error": "...", "requiresPassword": true}` when the password is missing
/// - `401 {"error": "..."}` when the password is wrong
/// - `404` unknown code, `410` inactive or expired link
pub async fn resolve_handler(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Visitor(request): Visitor,
) -> Result<Response, RedirectError> {
    let outcome = state.redirect_service.resolve(&code, &request).await?;

    if let Some(html) = outcome.cloaked_page {
        return Ok(cloaked_response(html));
    }

    Ok((
        [(header::CACHE_CONTROL, NO_STORE)],
        Json(ResolveResponse {
            original_url: outcome.destination,
        }),
    )
        .into_response())
}

/// Browser entry point: same resolution, answered with a redirect.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// Responds `307 Temporary Redirect`, or the cloaked page for cloaked links.
/// Errors use the same JSON bodies as [`resolve_handler`].
pub async fn redirect_handler(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Visitor(request): Visitor,
) -> Result<Response, RedirectError> {
    let outcome = state.redirect_service.resolve(&code, &request).await?;

    if let Some(html) = outcome.cloaked_page {
        return Ok(cloaked_response(html));
    }

    Ok((
        [(header::CACHE_CONTROL, NO_STORE)],
        Redirect::temporary(&outcome.destination),
    )
        .into_response())
}

fn cloaked_response(html: String) -> Response {
    (
        [
            (header::CONTENT_TYPE, cloaked_page_content_type()),
            (X_ROBOTS_TAG, "noindex, nofollow"),
            (header::CACHE_CONTROL, NO_STORE),
        ],
        html,
    )
        .into_response()
}
