//! Core domain entities of the redirect service.
//!
//! # Entity Types
//!
//! - [`Link`] - A short link with its default destination, access rules and cloaking settings
//! - [`LinkTarget`] - A device or geo rule mapping a request to an alternate destination
//! - [`AbTest`] / [`Variant`] - Weighted A/B test arms attached to a link
//! - [`Click`] - An append-only redirect event
//! - [`RequestMeta`] - Visitor attributes of one redirect request
//!
//! Creation inputs use separate `New*` structs (`NewClick`, `NewImpression`).

pub mod ab_test;
pub mod click;
pub mod link;
pub mod link_target;
pub mod request_meta;

pub use ab_test::{AbTest, AbTestStatus, NewImpression, Variant, VariantStats};
pub use click::{Click, NewClick};
pub use link::{CloakType, CloakingConfig, Link};
pub use link_target::{DeviceClass, LinkTarget, TargetKind};
pub use request_meta::RequestMeta;
