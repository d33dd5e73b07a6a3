//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain layer, providing
//! concrete implementations for data persistence, caching and geolocation.
//!
//! # Modules
//!
//! - [`cache`] - Link cache (Redis and no-op implementations)
//! - [`geoip`] - IP to country lookup (MaxMind and no-op implementations)
//! - [`memory`] - In-memory repository implementations
//! - [`persistence`] - PostgreSQL repository implementations

pub mod cache;
pub mod geoip;
pub mod memory;
pub mod persistence;
