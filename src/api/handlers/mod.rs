//! HTTP request handlers.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod health;
pub mod redirect;
pub mod stats;

pub use health::health_handler;
pub use redirect::{redirect_handler, resolve_handler};
pub use stats::stats_handler;
