//! Visitor fingerprint used to keep A/B assignments sticky.

use sha2::{Digest, Sha256};

/// Derives a stable fingerprint from client IP and user agent.
///
/// Returns the lowercase hex SHA-256 of `"{ip}|{user_agent}"`, with missing
/// values rendered as empty strings.
pub fn visitor_fingerprint(ip: Option<&str>, user_agent: Option<&str>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(ip.unwrap_or_default().as_bytes());
    hasher.update(b"|");
    hasher.update(user_agent.unwrap_or_default().as_bytes());
    hex::encode(hasher.finalize())
}
