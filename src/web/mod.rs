//! Server-rendered HTML served on the redirect path.
//!
//! Uses Askama templates compiled from `templates/`.
//!
//! # Modules
//!
//! - [`cloaking`] - Cloaked redirect pages (iframe, javascript, meta refresh)

pub mod cloaking;

pub use cloaking::{
    CloakError, CloakPage, DEFAULT_CLOAK_TITLE, cloaked_page_content_type, generate_cloaked_page,
};
