//! PostgreSQL repository implementations.
//!
//! Concrete implementations of domain repository traits using SQLx. Queries are
//! checked at runtime and decoded through the `FromRow` structs in [`rows`].
//!
//! # Repositories
//!
//! - [`PgLinkRepository`] - Links and their targets
//! - [`PgAbTestRepository`] - A/B tests, sticky assignments and impressions
//! - [`PgClickRepository`] - Click recording and counting
//! - [`PgTokenRepository`] - API token storage and validation

pub mod pg_ab_test_repository;
pub mod pg_click_repository;
pub mod pg_link_repository;
pub mod pg_token_repository;
mod rows;

pub use pg_ab_test_repository::PgAbTestRepository;
pub use pg_click_repository::PgClickRepository;
pub use pg_link_repository::PgLinkRepository;
pub use pg_token_repository::PgTokenRepository;
