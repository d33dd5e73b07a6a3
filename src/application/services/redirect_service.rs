//! Redirect resolution for short codes.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, warn};

use crate::application::services::{ClickTracker, TargetResolver, VariantSelector};
use crate::domain::click_event::ClickEvent;
use crate::domain::entities::{Link, RequestMeta};
use crate::domain::repositories::LinkRepository;
use crate::error::{AppError, RedirectError};
use crate::infrastructure::cache::{CacheService, LinkSnapshot};
use crate::utils::password::verify_password;
use crate::utils::short_code::is_valid_code;
use crate::web::cloaking::{CloakPage, generate_cloaked_page};

/// Which rule produced the destination of a redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestinationSource {
    Variant { test_id: i64, variant_id: i64 },
    Target { target_id: i64 },
    Default,
}

impl DestinationSource {
    fn outcome(&self) -> &'static str {
        match self {
            Self::Variant { .. } => "variant",
            Self::Target { .. } => "target",
            Self::Default => "default",
        }
    }
}

/// Result of a successful resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectOutcome {
    pub link_id: i64,
    pub destination: String,
    pub source: DestinationSource,
    /// Rendered HTML when the link is cloaked; the caller serves it instead of redirecting.
    pub cloaked_page: Option<String>,
}

/// Resolves a short code for one visitor.
///
/// Checks run in a fixed order and the first failure wins: unknown code,
/// inactive link, expired link, missing password, wrong password. A link
/// that passes queues one click and then takes its destination from the
/// running A/B test, a matching target rule, or its default URL, in that
/// order of precedence.
pub struct RedirectService {
    links: Arc<dyn LinkRepository>,
    cache: Arc<dyn CacheService>,
    clicks: ClickTracker,
    variants: VariantSelector,
    targets: TargetResolver,
}

impl RedirectService {
    pub fn new(
        links: Arc<dyn LinkRepository>,
        cache: Arc<dyn CacheService>,
        clicks: ClickTracker,
        variants: VariantSelector,
        targets: TargetResolver,
    ) -> Self {
        Self {
            links,
            cache,
            clicks,
            variants,
            targets,
        }
    }

    /// Resolves `code` to a destination for the visitor described by `request`.
    ///
    /// # Errors
    ///
    /// - [`RedirectError::NotFound`] for malformed or unknown codes
    /// - [`RedirectError::Gone`] for inactive or expired links
    /// - [`RedirectError::PasswordRequired`] when a protected link gets no password
    /// - [`RedirectError::Unauthorized`] on a wrong password
    /// - [`RedirectError::Internal`] on storage failures, unreadable password
    ///   hashes or an uncloakable destination
    pub async fn resolve(
        &self,
        code: &str,
        request: &RequestMeta,
    ) -> Result<RedirectOutcome, RedirectError> {
        let result = self.resolve_inner(code, request).await;

        let outcome = match &result {
            Ok(resolved) => resolved.source.outcome(),
            Err(e) => e.outcome(),
        };
        metrics::counter!("redirects_total", "outcome" => outcome).increment(1);

        result
    }

    async fn resolve_inner(
        &self,
        code: &str,
        request: &RequestMeta,
    ) -> Result<RedirectOutcome, RedirectError> {
        if !is_valid_code(code) {
            return Err(RedirectError::NotFound);
        }

        let LinkSnapshot { link, targets } = self
            .load_snapshot(code)
            .await?
            .ok_or(RedirectError::NotFound)?;

        if !link.is_active || link.is_expired() {
            return Err(RedirectError::Gone);
        }

        check_password(&link, request.password.as_deref()).await?;

        self.clicks.track(ClickEvent::new(link.id, &link.code, request));

        let ip = request.ip_string();
        let selected = match self
            .variants
            .select_and_track(link.id, ip.as_deref(), request.user_agent.as_deref())
            .await
        {
            Ok(selected) => selected,
            Err(e) => {
                warn!(
                    "A/B selection failed for {}, using targets instead: {}",
                    link.code, e
                );
                None
            }
        };

        let (destination, source) = match selected {
            Some(variant) => (
                variant.destination_url,
                DestinationSource::Variant {
                    test_id: variant.test_id,
                    variant_id: variant.variant_id,
                },
            ),
            None => {
                let resolved = self.targets.resolve(&link, &targets, request).await;
                let source = match resolved.target_id {
                    Some(target_id) => DestinationSource::Target { target_id },
                    None => DestinationSource::Default,
                };
                (resolved.url, source)
            }
        };

        let cloaked_page = match &link.cloaking {
            Some(cloak) => {
                let page = CloakPage {
                    destination_url: &destination,
                    title: cloak.title.as_deref(),
                    favicon: cloak.favicon.as_deref(),
                };
                let html = generate_cloaked_page(cloak.kind, &page).map_err(|e| {
                    AppError::internal(
                        "Failed to render cloaked page",
                        json!({ "code": link.code, "reason": e.to_string() }),
                    )
                })?;
                Some(html)
            }
            None => None,
        };

        debug!("Resolved {} -> {} ({:?})", code, destination, source);

        Ok(RedirectOutcome {
            link_id: link.id,
            destination,
            source,
            cloaked_page,
        })
    }

    /// Loads the link and its targets, preferring the cache.
    ///
    /// A repository hit fills the cache from a background task.
    async fn load_snapshot(&self, code: &str) -> Result<Option<LinkSnapshot>, AppError> {
        if let Ok(Some(snapshot)) = self.cache.get_link(code).await {
            return Ok(Some(snapshot));
        }

        let Some(link) = self.links.find_by_code(code).await? else {
            return Ok(None);
        };
        let targets = self.links.find_targets(link.id).await?;
        let snapshot = LinkSnapshot { link, targets };

        let cache = self.cache.clone();
        let key = code.to_string();
        let entry = snapshot.clone();
        tokio::spawn(async move {
            if let Err(e) = cache.set_link(&key, &entry, None).await {
                warn!("Failed to cache link {}: {}", key, e);
            }
        });

        Ok(Some(snapshot))
    }
}

async fn check_password(link: &Link, supplied: Option<&str>) -> Result<(), RedirectError> {
    let Some(hash) = link.password_hash.clone() else {
        return Ok(());
    };
    let Some(password) = supplied.filter(|p| !p.is_empty()).map(str::to_owned) else {
        return Err(RedirectError::PasswordRequired);
    };

    let verified = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| {
            AppError::internal(
                "Password verification task failed",
                json!({ "reason": e.to_string() }),
            )
        })?
        .map_err(|e| {
            AppError::internal(
                "Stored password hash is unreadable",
                json!({ "code": link.code, "reason": e.to_string() }),
            )
        })?;

    if verified {
        Ok(())
    } else {
        Err(RedirectError::Unauthorized)
    }
}
