//! Application layer services implementing business logic.
//!
//! Services consume repository and infrastructure traits through `Arc<dyn ...>`
//! and expose the operations used by the HTTP handlers and the admin CLI.
//!
//! # Available Services
//!
//! - [`services::redirect_service::RedirectService`] - Resolves a short code for a visitor
//! - [`services::target_resolver::TargetResolver`] - Device and geo targeting
//! - [`services::variant_selector::VariantSelector`] - A/B variant assignment
//! - [`services::click_tracker::ClickTracker`] - Non-blocking click queueing
//! - [`services::stats_service::StatsService`] - Click and experiment reporting
//! - [`services::auth_service::AuthService`] - API token authentication

pub mod services;
