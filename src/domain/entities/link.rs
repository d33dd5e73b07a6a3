//! Link entity representing a short link and its redirect settings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A short link with its default destination and access rules.
///
/// The link is reachable through `code` or through the optional `custom_alias`.
/// Password-protected links store an Argon2 PHC string in `password_hash`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub id: i64,
    pub code: String,
    pub custom_alias: Option<String>,
    pub original_url: String,
    pub password_hash: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub cloaking: Option<CloakingConfig>,
    pub created_at: DateTime<Utc>,
}

impl Link {
    /// Creates an active, unprotected link without expiry or cloaking.
    pub fn new(id: i64, code: impl Into<String>, original_url: impl Into<String>) -> Self {
        Self {
            id,
            code: code.into(),
            custom_alias: None,
            original_url: original_url.into(),
            password_hash: None,
            expires_at: None,
            is_active: true,
            cloaking: None,
            created_at: Utc::now(),
        }
    }

    /// Returns true if the link has passed its expiry time at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|e| now >= e)
    }

    /// Returns true if the link has passed its expiry time.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn is_password_protected(&self) -> bool {
        self.password_hash.is_some()
    }
}

/// How a cloaked link hides its destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloakType {
    /// Destination embedded in a full-viewport iframe.
    Iframe,
    /// Destination assigned to `window.location` once the page loads.
    Javascript,
    /// Destination announced through `<meta http-equiv="refresh">`.
    MetaRefresh,
}

impl CloakType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Iframe => "iframe",
            Self::Javascript => "javascript",
            Self::MetaRefresh => "meta_refresh",
        }
    }
}

impl fmt::Display for CloakType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown cloak type: {0}")]
pub struct UnknownCloakType(pub String);

impl FromStr for CloakType {
    type Err = UnknownCloakType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "iframe" => Ok(Self::Iframe),
            "javascript" | "js" => Ok(Self::Javascript),
            "meta_refresh" | "meta-refresh" | "meta" => Ok(Self::MetaRefresh),
            other => Err(UnknownCloakType(other.to_string())),
        }
    }
}

/// Cloaking settings of a link. Presence of this value enables cloaking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloakingConfig {
    pub kind: CloakType,
    pub title: Option<String>,
    pub favicon: Option<String>,
}
