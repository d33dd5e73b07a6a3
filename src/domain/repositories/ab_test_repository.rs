//! Repository trait for A/B tests, sticky assignments and impressions.

use crate::domain::entities::{AbTest, NewImpression, VariantStats};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Repository interface for A/B test state.
///
/// Assignments are keyed by `(test_id, fingerprint)`. The store's uniqueness
/// constraint on that pair is what keeps concurrent first visits from the same
/// visitor from producing two different arms.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AbTestRepository: Send + Sync {
    /// Returns the latest test of the link that is running at `now`, with its variants.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_active_for_link(
        &self,
        link_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<AbTest>, AppError>;

    /// Returns the latest test of the link regardless of state, with its variants.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_latest_for_link(&self, link_id: i64) -> Result<Option<AbTest>, AppError>;

    /// Returns the variant previously assigned to a visitor, if any.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_assignment(
        &self,
        test_id: i64,
        fingerprint: &str,
    ) -> Result<Option<i64>, AppError>;

    /// Stores `variant_id` for the visitor unless an assignment already exists.
    ///
    /// Returns the variant that is assigned after the call: `variant_id` when this
    /// call won, or the previously stored variant when another request got there first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn get_or_create_assignment(
        &self,
        test_id: i64,
        fingerprint: &str,
        variant_id: i64,
    ) -> Result<i64, AppError>;

    /// Overwrites the visitor's assignment. Used when the stored variant is gone.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn replace_assignment(
        &self,
        test_id: i64,
        fingerprint: &str,
        variant_id: i64,
    ) -> Result<(), AppError>;

    /// Appends an exposure record.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn record_impression(&self, impression: NewImpression) -> Result<(), AppError>;

    /// Per-variant assignment and impression counters of a test.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn variant_stats(&self, test_id: i64) -> Result<Vec<VariantStats>, AppError>;
}
