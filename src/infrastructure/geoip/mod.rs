//! IP geolocation used by geo targeting.
//!
//! Provides a [`GeoLookup`] trait with two implementations:
//! - [`MaxMindGeoLookup`] - Local MaxMind GeoLite2 database
//! - [`NullGeoLookup`] - Always unknown; geo targets never match

mod maxmind;
mod null_geo;
mod service;

pub use maxmind::MaxMindGeoLookup;
pub use null_geo::NullGeoLookup;
pub use service::{GeoInfo, GeoLookup};
