//! DTOs for the redirect resolution endpoint.

use serde::{Deserialize, Serialize};

/// Body of a successful `GET /api/r/{code}`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveResponse {
    pub original_url: String,
}
