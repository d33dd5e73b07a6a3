//! Click entity representing a single redirect event.

use chrono::{DateTime, Utc};

/// A click event recorded when a short link is resolved.
///
/// Append-only: rows are never updated after insertion.
#[derive(Debug, Clone)]
pub struct Click {
    pub id: i64,
    pub link_id: i64,
    pub clicked_at: DateTime<Utc>,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
}

/// Input data for recording a new click event.
///
/// The timestamp is set by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewClick {
    pub link_id: i64,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
}
