//! Repository trait for short link data access.

use crate::domain::entities::{Link, LinkTarget};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for links and their targeting rules.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::memory::MemoryStore`] - in-memory implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Finds a link by short code or custom alias.
    ///
    /// An exact short-code match takes precedence over an alias match.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError>;

    /// Lists every target of a link ordered by `(priority ASC, id ASC)`.
    ///
    /// Inactive targets are included; callers filter them.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_targets(&self, link_id: i64) -> Result<Vec<LinkTarget>, AppError>;

    /// Sets or clears the password hash of the link with the given short code.
    ///
    /// Returns `Ok(false)` if no link has that code.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn set_password(
        &self,
        code: &str,
        password_hash: Option<String>,
    ) -> Result<bool, AppError>;

    /// Verifies that the store is reachable.
    async fn ping(&self) -> Result<(), AppError>;
}
