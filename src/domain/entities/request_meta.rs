//! Request metadata consumed by redirect resolution.

use std::net::IpAddr;

/// Visitor attributes extracted from an incoming redirect request.
///
/// Every field is optional; resolution must degrade to the link's default
/// destination when a value is missing or malformed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestMeta {
    pub ip: Option<IpAddr>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
    /// Raw `x-link-password` header value.
    pub password: Option<String>,
    /// Country code supplied by a trusted edge proxy, if configured.
    pub country: Option<String>,
}

impl RequestMeta {
    pub fn ip_string(&self) -> Option<String> {
        self.ip.map(|ip| ip.to_string())
    }
}
