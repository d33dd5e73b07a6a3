//! Repository trait definitions for the domain layer.
//!
//! Traits define the data-access contracts; implementations live in
//! `crate::infrastructure::persistence` (PostgreSQL) and
//! `crate::infrastructure::memory` (in-memory). Mock implementations are
//! generated via `mockall` for unit tests.
//!
//! # Available Repositories
//!
//! - [`LinkRepository`] - Link and target lookups
//! - [`AbTestRepository`] - A/B tests, sticky assignments and impressions
//! - [`ClickRepository`] - Click recording and counting
//! - [`TokenRepository`] - API token authentication

pub mod ab_test_repository;
pub mod click_repository;
pub mod link_repository;
pub mod token_repository;

pub use ab_test_repository::AbTestRepository;
pub use click_repository::ClickRepository;
pub use link_repository::LinkRepository;
pub use token_repository::{ApiToken, TokenRepository};

#[cfg(test)]
pub use ab_test_repository::MockAbTestRepository;
#[cfg(test)]
pub use click_repository::MockClickRepository;
#[cfg(test)]
pub use link_repository::MockLinkRepository;
#[cfg(test)]
pub use token_repository::MockTokenRepository;
