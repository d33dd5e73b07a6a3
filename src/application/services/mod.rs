//! Business logic services for the application layer.

pub mod auth_service;
pub mod click_tracker;
pub mod redirect_service;
pub mod stats_service;
pub mod target_resolver;
pub mod variant_selector;

pub use auth_service::{AuthService, hash_token};
pub use click_tracker::ClickTracker;
pub use redirect_service::{DestinationSource, RedirectOutcome, RedirectService};
pub use stats_service::{LinkReport, StatsService, TestReport};
pub use target_resolver::{ResolvedDestination, TargetResolver};
pub use variant_selector::{SelectedVariant, VariantSelector};
