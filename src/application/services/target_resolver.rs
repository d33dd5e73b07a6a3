//! Device and geo targeting.

use std::sync::Arc;

use tracing::debug;

use crate::domain::entities::{DeviceClass, Link, LinkTarget, RequestMeta, TargetKind};
use crate::infrastructure::geoip::GeoLookup;
use crate::utils::user_agent::classify_device;

/// Destination chosen for a request, with the target rule that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDestination {
    pub url: String,
    /// `None` when no rule matched and the link's default URL is used.
    pub target_id: Option<i64>,
}

/// Picks a destination among a link's device and geo targets.
///
/// Never fails: a missing user agent classifies as desktop, and an unknown
/// country simply leaves geo rules unmatched.
pub struct TargetResolver {
    geo: Arc<dyn GeoLookup>,
}

impl TargetResolver {
    pub fn new(geo: Arc<dyn GeoLookup>) -> Self {
        Self { geo }
    }

    pub async fn resolve(
        &self,
        link: &Link,
        targets: &[LinkTarget],
        request: &RequestMeta,
    ) -> ResolvedDestination {
        let device = classify_device(request.user_agent.as_deref());
        let country = self.country_for(targets, request).await;

        match select_target(targets, device, country.as_deref()) {
            Some(target) => {
                debug!(
                    "Link {} matched target {} ({} = {})",
                    link.code,
                    target.id,
                    target.kind.as_str(),
                    target.value
                );
                ResolvedDestination {
                    url: target.destination_url.clone(),
                    target_id: Some(target.id),
                }
            }
            None => ResolvedDestination {
                url: link.original_url.clone(),
                target_id: None,
            },
        }
    }

    /// Country of the visitor, looked up only when an active geo rule could use it.
    async fn country_for(&self, targets: &[LinkTarget], request: &RequestMeta) -> Option<String> {
        let needs_geo = targets
            .iter()
            .any(|t| t.is_active && t.kind == TargetKind::Geo);
        if !needs_geo {
            return None;
        }

        if let Some(country) = request.country.as_deref().map(str::trim)
            && !country.is_empty()
        {
            return Some(country.to_ascii_uppercase());
        }

        let ip = request.ip?;
        self.geo.lookup(ip).await.and_then(|info| info.country)
    }
}

/// Returns the active target with the lowest `(priority, id)` that matches.
pub fn select_target<'a>(
    targets: &'a [LinkTarget],
    device: DeviceClass,
    country: Option<&str>,
) -> Option<&'a LinkTarget> {
    targets
        .iter()
        .filter(|t| t.is_active && t.matches(device, country))
        .min_by_key(|t| (t.priority, t.id))
}
