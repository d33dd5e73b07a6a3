//! PostgreSQL implementation of A/B test repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use super::rows::{AbTestRow, VariantRow, VariantStatsRow};
use crate::domain::entities::{AbTest, NewImpression, Variant, VariantStats};
use crate::domain::repositories::AbTestRepository;
use crate::error::AppError;

/// PostgreSQL repository for A/B tests.
///
/// Sticky assignments rely on the `(test_id, fingerprint)` primary key of
/// `ab_test_assignments`; no application-level locking is involved.
pub struct PgAbTestRepository {
    pool: Arc<PgPool>,
}

impl PgAbTestRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    async fn load_variants(&self, test_id: i64) -> Result<Vec<Variant>, AppError> {
        let rows = sqlx::query_as::<_, VariantRow>(
            r#"
            SELECT id, test_id, name, destination_url, weight
            FROM ab_test_variants
            WHERE test_id = $1
            ORDER BY position ASC, id ASC
            "#,
        )
        .bind(test_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Variant::from).collect())
    }

    async fn with_variants(&self, row: Option<AbTestRow>) -> Result<Option<AbTest>, AppError> {
        match row {
            Some(row) => {
                let variants = self.load_variants(row.id).await?;
                row.into_test(variants).map(Some)
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl AbTestRepository for PgAbTestRepository {
    async fn find_active_for_link(
        &self,
        link_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<AbTest>, AppError> {
        let row = sqlx::query_as::<_, AbTestRow>(
            r#"
            SELECT id, link_id, name, status, started_at, ended_at
            FROM ab_tests
            WHERE link_id = $1
              AND status = 'running'
              AND (started_at IS NULL OR started_at <= $2)
              AND (ended_at IS NULL OR ended_at > $2)
            ORDER BY id DESC
            LIMIT 1
            "#,
        )
        .bind(link_id)
        .bind(now)
        .fetch_optional(self.pool.as_ref())
        .await?;

        self.with_variants(row).await
    }

    async fn find_latest_for_link(&self, link_id: i64) -> Result<Option<AbTest>, AppError> {
        let row = sqlx::query_as::<_, AbTestRow>(
            r#"
            SELECT id, link_id, name, status, started_at, ended_at
            FROM ab_tests
            WHERE link_id = $1
            ORDER BY id DESC
            LIMIT 1
            "#,
        )
        .bind(link_id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        self.with_variants(row).await
    }

    async fn find_assignment(
        &self,
        test_id: i64,
        fingerprint: &str,
    ) -> Result<Option<i64>, AppError> {
        let variant_id = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT variant_id
            FROM ab_test_assignments
            WHERE test_id = $1 AND fingerprint = $2
            "#,
        )
        .bind(test_id)
        .bind(fingerprint)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(variant_id)
    }

    async fn get_or_create_assignment(
        &self,
        test_id: i64,
        fingerprint: &str,
        variant_id: i64,
    ) -> Result<i64, AppError> {
        let stored = sqlx::query_scalar::<_, i64>(
            r#"
            WITH inserted AS (
                INSERT INTO ab_test_assignments (test_id, fingerprint, variant_id)
                VALUES ($1, $2, $3)
                ON CONFLICT (test_id, fingerprint) DO NOTHING
                RETURNING variant_id
            )
            SELECT variant_id FROM inserted
            UNION ALL
            SELECT variant_id FROM ab_test_assignments
            WHERE test_id = $1 AND fingerprint = $2
            LIMIT 1
            "#,
        )
        .bind(test_id)
        .bind(fingerprint)
        .bind(variant_id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        if let Some(stored) = stored {
            return Ok(stored);
        }

        // Lost a race with a transaction that committed after this statement's snapshot.
        self.find_assignment(test_id, fingerprint)
            .await?
            .ok_or_else(|| {
                AppError::internal(
                    "Assignment vanished after conflict",
                    serde_json::json!({ "test_id": test_id }),
                )
            })
    }

    async fn replace_assignment(
        &self,
        test_id: i64,
        fingerprint: &str,
        variant_id: i64,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO ab_test_assignments (test_id, fingerprint, variant_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (test_id, fingerprint)
            DO UPDATE SET variant_id = EXCLUDED.variant_id, assigned_at = NOW()
            "#,
        )
        .bind(test_id)
        .bind(fingerprint)
        .bind(variant_id)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn record_impression(&self, impression: NewImpression) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO ab_test_impressions (test_id, variant_id, link_id, fingerprint)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(impression.test_id)
        .bind(impression.variant_id)
        .bind(impression.link_id)
        .bind(impression.fingerprint)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn variant_stats(&self, test_id: i64) -> Result<Vec<VariantStats>, AppError> {
        let rows = sqlx::query_as::<_, VariantStatsRow>(
            r#"
            SELECT
                v.id AS variant_id,
                v.name,
                v.destination_url,
                v.weight,
                (SELECT COUNT(*) FROM ab_test_assignments a WHERE a.variant_id = v.id) AS assignments,
                (SELECT COUNT(*) FROM ab_test_impressions i WHERE i.variant_id = v.id) AS impressions
            FROM ab_test_variants v
            WHERE v.test_id = $1
            ORDER BY v.position ASC, v.id ASC
            "#,
        )
        .bind(test_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(VariantStats::from).collect())
    }
}
