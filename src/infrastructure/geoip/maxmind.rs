//! MaxMind GeoLite2 database lookup.

use std::net::IpAddr;
use std::sync::Arc;

use async_trait::async_trait;
use maxminddb::Reader;
use tracing::trace;

use super::service::{GeoInfo, GeoLookup};

/// Geo lookup backed by a local `.mmdb` file (GeoLite2-Country or GeoLite2-City).
///
/// The whole database is read into memory at startup; lookups are in-process and
/// take microseconds. Accuracy is country-level and depends on how recently the
/// database file was refreshed.
pub struct MaxMindGeoLookup {
    reader: Arc<Reader<Vec<u8>>>,
}

impl MaxMindGeoLookup {
    /// Opens the database at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or not a valid MaxMind database.
    pub fn open(path: &str) -> Result<Self, maxminddb::MaxMindDbError> {
        let reader = Reader::open_readfile(path)?;
        Ok(Self {
            reader: Arc::new(reader),
        })
    }
}

#[async_trait]
impl GeoLookup for MaxMindGeoLookup {
    async fn lookup(&self, ip: IpAddr) -> Option<GeoInfo> {
        let result = self.reader.lookup(ip).ok()?;
        let record: maxminddb::geoip2::City = result.decode().ok()??;

        let country = record.country.iso_code.map(String::from);
        trace!("MaxMind lookup for {}: country={:?}", ip, country);

        Some(GeoInfo { country })
    }

    fn name(&self) -> &'static str {
        "maxmind"
    }
}
