//! DTOs for the link statistics endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::services::{LinkReport, TestReport};
use crate::domain::entities::VariantStats;

/// Query parameters of `GET /api/stats/{code}`.
#[derive(Debug, Default, Deserialize)]
pub struct StatsQuery {
    /// Start date (RFC 3339), inclusive.
    pub from: Option<DateTime<Utc>>,
    /// End date (RFC 3339), inclusive.
    pub to: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatsResponse {
    pub code: String,
    pub original_url: String,
    pub is_active: bool,
    pub total_clicks: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ab_test: Option<AbTestStatsDto>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AbTestStatsDto {
    pub id: i64,
    pub name: String,
    pub status: String,
    pub variants: Vec<VariantStatsDto>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VariantStatsDto {
    pub id: i64,
    pub name: String,
    pub destination_url: String,
    pub weight: i32,
    pub assignments: i64,
    pub impressions: i64,
}

impl From<LinkReport> for StatsResponse {
    fn from(report: LinkReport) -> Self {
        Self {
            code: report.code,
            original_url: report.original_url,
            is_active: report.is_active,
            total_clicks: report.total_clicks,
            ab_test: report.ab_test.map(AbTestStatsDto::from),
        }
    }
}

impl From<TestReport> for AbTestStatsDto {
    fn from(test: TestReport) -> Self {
        Self {
            id: test.test_id,
            name: test.name,
            status: test.status.as_str().to_string(),
            variants: test.variants.into_iter().map(VariantStatsDto::from).collect(),
        }
    }
}

impl From<VariantStats> for VariantStatsDto {
    fn from(v: VariantStats) -> Self {
        Self {
            id: v.variant_id,
            name: v.name,
            destination_url: v.destination_url,
            weight: v.weight,
            assignments: v.assignments,
            impressions: v.impressions,
        }
    }
}
