//! Geo lookup trait.

use async_trait::async_trait;
use std::net::IpAddr;

/// Location attributes resolved for an IP address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeoInfo {
    /// ISO 3166-1 alpha-2 country code (e.g. "US", "DE").
    pub country: Option<String>,
}

/// Resolves an IP address to a location.
///
/// Implementations never fail: an unknown or unroutable address yields `None`.
#[async_trait]
pub trait GeoLookup: Send + Sync {
    async fn lookup(&self, ip: IpAddr) -> Option<GeoInfo>;

    /// Provider name for logs and health output.
    fn name(&self) -> &'static str;
}
