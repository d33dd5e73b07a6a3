//! A/B variant selection with sticky assignments.

use std::sync::Arc;

use chrono::Utc;
use rand::Rng;
use tracing::{debug, warn};

use crate::domain::entities::{AbTest, NewImpression, Variant};
use crate::domain::repositories::AbTestRepository;
use crate::error::AppError;
use crate::utils::fingerprint::visitor_fingerprint;

/// The variant a visitor was routed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedVariant {
    pub test_id: i64,
    pub variant_id: i64,
    pub name: String,
    pub destination_url: String,
    /// True if the visitor already held this assignment.
    pub sticky: bool,
}

/// Selects and records A/B variants for links with a running test.
pub struct VariantSelector {
    tests: Arc<dyn AbTestRepository>,
}

impl VariantSelector {
    pub fn new(tests: Arc<dyn AbTestRepository>) -> Self {
        Self { tests }
    }

    /// Routes a visitor through the link's active test, if there is one.
    ///
    /// Returns `Ok(None)` when the link has no running test or every variant
    /// weighs zero. A returning visitor keeps the variant stored for their
    /// fingerprint; a new visitor gets a weighted draw that is persisted with a
    /// conditional insert, so concurrent first visits converge on one variant.
    /// Each call appends one impression; impression failures are only logged.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if the test or assignment cannot be read
    /// or written.
    pub async fn select_and_track(
        &self,
        link_id: i64,
        ip: Option<&str>,
        user_agent: Option<&str>,
    ) -> Result<Option<SelectedVariant>, AppError> {
        let Some(test) = self.tests.find_active_for_link(link_id, Utc::now()).await? else {
            return Ok(None);
        };

        if !test.is_selectable() {
            debug!("A/B test {} has no weighted variants, ignoring", test.id);
            return Ok(None);
        }

        let fingerprint = visitor_fingerprint(ip, user_agent);

        let (variant_id, kind) = match self.tests.find_assignment(test.id, &fingerprint).await? {
            Some(stored) if is_drawable(&test, stored) => (stored, "sticky"),
            Some(stale) => {
                let Some(fresh) = draw(&test) else {
                    return Ok(None);
                };
                debug!(
                    "Reassigning visitor in test {} from variant {} to {}",
                    test.id, stale, fresh
                );
                self.tests
                    .replace_assignment(test.id, &fingerprint, fresh)
                    .await?;
                (fresh, "reassigned")
            }
            None => {
                let Some(fresh) = draw(&test) else {
                    return Ok(None);
                };
                let stored = self
                    .tests
                    .get_or_create_assignment(test.id, &fingerprint, fresh)
                    .await?;
                (stored, if stored == fresh { "new" } else { "sticky" })
            }
        };

        let Some(variant) = test.variant(variant_id) else {
            warn!(
                "Assignment in test {} points at unknown variant {}",
                test.id, variant_id
            );
            return Ok(None);
        };

        metrics::counter!("ab_assignments_total", "kind" => kind).increment(1);

        let impression = NewImpression {
            test_id: test.id,
            variant_id: variant.id,
            link_id,
            fingerprint,
        };
        if let Err(e) = self.tests.record_impression(impression).await {
            warn!("Failed to record impression for test {}: {}", test.id, e);
        }

        Ok(Some(SelectedVariant {
            test_id: test.id,
            variant_id: variant.id,
            name: variant.name.clone(),
            destination_url: variant.destination_url.clone(),
            sticky: kind == "sticky",
        }))
    }
}

fn is_drawable(test: &AbTest, variant_id: i64) -> bool {
    test.variant(variant_id).is_some_and(|v| v.weight > 0)
}

fn draw(test: &AbTest) -> Option<i64> {
    let mut rng = rand::rng();
    pick_weighted(&test.variants, &mut rng).map(|v| v.id)
}

/// Weighted draw over the cumulative weights of `variants`.
///
/// Draws uniformly in `[0, total)` and walks the variants until the draw falls
/// inside one's bucket. Negative weights count as zero. Returns `None` when
/// the total weight is zero.
pub fn pick_weighted<'a, R: Rng + ?Sized>(
    variants: &'a [Variant],
    rng: &mut R,
) -> Option<&'a Variant> {
    let total: u64 = variants.iter().map(|v| v.weight.max(0) as u64).sum();
    if total == 0 {
        return None;
    }

    let mut remaining = rng.random_range(0..total);
    for variant in variants {
        let weight = variant.weight.max(0) as u64;
        if remaining < weight {
            return Some(variant);
        }
        remaining -= weight;
    }

    None
}
