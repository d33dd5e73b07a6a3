//! Row structs decoded by `sqlx::FromRow` and their mapping to entities.

use chrono::{DateTime, Utc};
use serde_json::json;

use crate::domain::entities::{
    AbTest, AbTestStatus, Click, CloakType, CloakingConfig, Link, LinkTarget, TargetKind,
    Variant, VariantStats,
};
use crate::domain::repositories::ApiToken;
use crate::error::AppError;

fn corrupt(table: &str, id: i64, reason: String) -> AppError {
    tracing::error!("Invalid row {} in {}: {}", id, table, reason);
    AppError::internal("Corrupt database row", json!({ "table": table, "id": id }))
}

#[derive(Debug, sqlx::FromRow)]
pub(super) struct LinkRow {
    pub id: i64,
    pub code: String,
    pub custom_alias: Option<String>,
    pub original_url: String,
    pub password_hash: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub cloak_type: Option<String>,
    pub cloak_title: Option<String>,
    pub cloak_favicon: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<LinkRow> for Link {
    type Error = AppError;

    fn try_from(row: LinkRow) -> Result<Self, Self::Error> {
        let cloaking = match row.cloak_type {
            Some(kind) => Some(CloakingConfig {
                kind: kind
                    .parse::<CloakType>()
                    .map_err(|e| corrupt("links", row.id, e.to_string()))?,
                title: row.cloak_title,
                favicon: row.cloak_favicon,
            }),
            None => None,
        };

        Ok(Link {
            id: row.id,
            code: row.code,
            custom_alias: row.custom_alias,
            original_url: row.original_url,
            password_hash: row.password_hash,
            expires_at: row.expires_at,
            is_active: row.is_active,
            cloaking,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(super) struct TargetRow {
    pub id: i64,
    pub link_id: i64,
    pub target_type: String,
    pub value: String,
    pub destination_url: String,
    pub priority: i32,
    pub is_active: bool,
}

impl TryFrom<TargetRow> for LinkTarget {
    type Error = AppError;

    fn try_from(row: TargetRow) -> Result<Self, Self::Error> {
        let kind = row
            .target_type
            .parse::<TargetKind>()
            .map_err(|e| corrupt("link_targets", row.id, e))?;

        Ok(LinkTarget {
            id: row.id,
            link_id: row.link_id,
            kind,
            value: row.value,
            destination_url: row.destination_url,
            priority: row.priority,
            is_active: row.is_active,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(super) struct AbTestRow {
    pub id: i64,
    pub link_id: i64,
    pub name: String,
    pub status: String,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl AbTestRow {
    pub fn into_test(self, variants: Vec<Variant>) -> Result<AbTest, AppError> {
        let status = self
            .status
            .parse::<AbTestStatus>()
            .map_err(|e| corrupt("ab_tests", self.id, e))?;

        Ok(AbTest {
            id: self.id,
            link_id: self.link_id,
            name: self.name,
            status,
            started_at: self.started_at,
            ended_at: self.ended_at,
            variants,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(super) struct VariantRow {
    pub id: i64,
    pub test_id: i64,
    pub name: String,
    pub destination_url: String,
    pub weight: i32,
}

impl From<VariantRow> for Variant {
    fn from(row: VariantRow) -> Self {
        Variant {
            id: row.id,
            test_id: row.test_id,
            name: row.name,
            destination_url: row.destination_url,
            weight: row.weight,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(super) struct VariantStatsRow {
    pub variant_id: i64,
    pub name: String,
    pub destination_url: String,
    pub weight: i32,
    pub assignments: i64,
    pub impressions: i64,
}

impl From<VariantStatsRow> for VariantStats {
    fn from(row: VariantStatsRow) -> Self {
        VariantStats {
            variant_id: row.variant_id,
            name: row.name,
            destination_url: row.destination_url,
            weight: row.weight,
            assignments: row.assignments,
            impressions: row.impressions,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(super) struct ClickRow {
    pub id: i64,
    pub link_id: i64,
    pub clicked_at: DateTime<Utc>,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
}

impl From<ClickRow> for Click {
    fn from(row: ClickRow) -> Self {
        Click {
            id: row.id,
            link_id: row.link_id,
            clicked_at: row.clicked_at,
            ip: row.ip,
            user_agent: row.user_agent,
            referer: row.referer,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(super) struct TokenRow {
    pub id: i64,
    pub name: String,
    pub token_hash: String,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl From<TokenRow> for ApiToken {
    fn from(row: TokenRow) -> Self {
        ApiToken {
            id: row.id,
            name: row.name,
            token_hash: row.token_hash,
            created_at: row.created_at,
            last_used_at: row.last_used_at,
            revoked_at: row.revoked_at,
        }
    }
}
