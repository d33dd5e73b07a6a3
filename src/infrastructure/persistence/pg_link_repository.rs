//! PostgreSQL implementation of link repository.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use super::rows::{LinkRow, TargetRow};
use crate::domain::entities::{Link, LinkTarget};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

/// PostgreSQL repository for links and their targeting rules.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT id, code, custom_alias, original_url, password_hash, expires_at,
                   is_active, cloak_type, cloak_title, cloak_favicon, created_at
            FROM links
            WHERE code = $1 OR custom_alias = $1
            ORDER BY (code = $1) DESC
            LIMIT 1
            "#,
        )
        .bind(code)
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(Link::try_from).transpose()
    }

    async fn find_targets(&self, link_id: i64) -> Result<Vec<LinkTarget>, AppError> {
        let rows = sqlx::query_as::<_, TargetRow>(
            r#"
            SELECT id, link_id, target_type, value, destination_url, priority, is_active
            FROM link_targets
            WHERE link_id = $1
            ORDER BY priority ASC, id ASC
            "#,
        )
        .bind(link_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        rows.into_iter().map(LinkTarget::try_from).collect()
    }

    async fn set_password(
        &self,
        code: &str,
        password_hash: Option<String>,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE links
            SET password_hash = $2
            WHERE code = $1
            "#,
        )
        .bind(code)
        .bind(password_hash)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(self.pool.as_ref()).await?;
        Ok(())
    }
}
