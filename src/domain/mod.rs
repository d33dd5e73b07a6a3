//! Domain layer containing business entities and data-access contracts.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//! - [`click_event`] - Click tracking event model
//! - [`click_worker`] - Asynchronous click processing worker
//!
//! The domain layer has no dependencies on infrastructure or presentation layers.
//!
//! # Click Processing Flow
//!
//! 1. Redirect resolution passes the access checks of a link
//! 2. A [`click_event::ClickEvent`] is queued without blocking the response
//! 3. [`click_worker::run_click_worker`] persists it with retry logic
//! 4. Click data is stored via [`repositories::ClickRepository`]

pub mod click_event;
pub mod click_worker;
pub mod entities;
pub mod repositories;
