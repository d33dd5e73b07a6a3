//! No-op geo lookup used when no GeoIP database is configured.

use super::service::{GeoInfo, GeoLookup};
use async_trait::async_trait;
use std::net::IpAddr;

/// A geo lookup that never knows where a visitor is.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullGeoLookup;

#[async_trait]
impl GeoLookup for NullGeoLookup {
    async fn lookup(&self, _ip: IpAddr) -> Option<GeoInfo> {
        None
    }

    fn name(&self) -> &'static str {
        "none"
    }
}
