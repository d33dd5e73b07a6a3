//! Rate limiting middleware using token bucket algorithm.
//!
//! Two key extractors are supported: the socket peer address for direct
//! deployments and [`SmartIpKeyExtractor`] (`X-Forwarded-For`, `X-Real-IP`,
//! `Forwarded`, then peer) when the service runs behind a reverse proxy.

use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use std::sync::Arc;
use tower_governor::{
    GovernorLayer,
    governor::GovernorConfigBuilder,
    key_extractor::{KeyExtractor, PeerIpKeyExtractor, SmartIpKeyExtractor},
};

pub type RateLimitLayer<K> = GovernorLayer<K, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

const PUBLIC_PER_SECOND: u64 = 20;
const PUBLIC_BURST: u32 = 200;
const SECURE_PER_SECOND: u64 = 2;
const SECURE_BURST: u32 = 20;

fn build<K: KeyExtractor>(key_extractor: K, per_second: u64, burst: u32) -> RateLimitLayer<K> {
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .key_extractor(key_extractor)
            .per_second(per_second)
            .burst_size(burst)
            .finish()
            .unwrap(),
    );

    GovernorLayer::new(governor_conf)
}

/// Rate limiter for redirect resolution, keyed by socket peer address.
///
/// # Limits
///
/// - **Rate**: 20 requests per second
/// - **Burst**: 200 requests
///
/// Requests exceeding the limit receive `429 Too Many Requests`.
pub fn layer() -> RateLimitLayer<PeerIpKeyExtractor> {
    build(PeerIpKeyExtractor, PUBLIC_PER_SECOND, PUBLIC_BURST)
}

/// Same limits as [`layer`], keyed by the forwarded client address.
pub fn proxied_layer() -> RateLimitLayer<SmartIpKeyExtractor> {
    build(SmartIpKeyExtractor, PUBLIC_PER_SECOND, PUBLIC_BURST)
}

/// Creates a stricter rate limiter for authenticated endpoints.
///
/// # Limits
///
/// - **Rate**: 2 requests per second
/// - **Burst**: 20 requests
pub fn secure_layer() -> RateLimitLayer<PeerIpKeyExtractor> {
    build(PeerIpKeyExtractor, SECURE_PER_SECOND, SECURE_BURST)
}

/// Same limits as [`secure_layer`], keyed by the forwarded client address.
pub fn proxied_secure_layer() -> RateLimitLayer<SmartIpKeyExtractor> {
    build(SmartIpKeyExtractor, SECURE_PER_SECOND, SECURE_BURST)
}
