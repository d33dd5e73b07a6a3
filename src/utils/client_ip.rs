//! Client address extraction.

use axum::http::HeaderMap;
use std::net::IpAddr;

/// Returns the address requests should be attributed to.
///
/// Forwarding headers are honoured only when `behind_proxy` is set: the first
/// entry of `X-Forwarded-For` wins, then `X-Real-IP`. Unparseable header
/// values fall back to the socket peer.
pub fn client_ip(headers: &HeaderMap, peer: Option<IpAddr>, behind_proxy: bool) -> Option<IpAddr> {
    if behind_proxy {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .and_then(|v| v.trim().parse::<IpAddr>().ok());
        if forwarded.is_some() {
            return forwarded;
        }

        let real_ip = headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<IpAddr>().ok());
        if real_ip.is_some() {
            return real_ip;
        }
    }

    peer
}
