//! Extractors shared by the redirect handlers.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::{HeaderMap, HeaderName, header, request::Parts};

use crate::domain::entities::RequestMeta;
use crate::state::AppState;
use crate::utils::client_ip::client_ip;

/// Header carrying the password of a protected link.
pub const LINK_PASSWORD_HEADER: HeaderName = HeaderName::from_static("x-link-password");

/// Visitor metadata of the current request.
///
/// Never rejects: headers that are missing or not valid UTF-8 are left out.
#[derive(Debug, Clone)]
pub struct Visitor(pub RequestMeta);

impl FromRequestParts<AppState> for Visitor {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());
        let headers = &parts.headers;

        let country = state
            .settings
            .geo_country_header
            .as_ref()
            .and_then(|name| header_string(headers, name));

        Ok(Visitor(RequestMeta {
            ip: client_ip(headers, peer, state.settings.behind_proxy),
            user_agent: header_string(headers, &header::USER_AGENT),
            referer: header_string(headers, &header::REFERER),
            password: header_string(headers, &LINK_PASSWORD_HEADER),
            country,
        }))
    }
}

fn header_string(headers: &HeaderMap, name: &HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
}
