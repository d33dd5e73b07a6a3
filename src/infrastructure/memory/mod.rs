//! In-memory repository implementations.
//!
//! Backs the HTTP tests and any setup that runs without PostgreSQL.
//! Everything is lost when the process exits.

mod store;

pub use store::MemoryStore;
