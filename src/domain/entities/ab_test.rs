//! A/B test entities: tests, their variants, exposures and per-variant statistics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbTestStatus {
    Running,
    Stopped,
}

impl AbTestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Stopped => "stopped",
        }
    }
}

impl FromStr for AbTestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "running" => Ok(Self::Running),
            "stopped" => Ok(Self::Stopped),
            other => Err(format!("unknown A/B test status: {other}")),
        }
    }
}

/// One arm of an A/B test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    pub id: i64,
    pub test_id: i64,
    pub name: String,
    pub destination_url: String,
    /// Relative selection weight. Zero-weight variants are never drawn.
    pub weight: i32,
}

/// An A/B test attached to a link, with its variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbTest {
    pub id: i64,
    pub link_id: i64,
    pub name: String,
    pub status: AbTestStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub variants: Vec<Variant>,
}

impl AbTest {
    /// Returns true if the test is running and `now` lies inside its time window.
    pub fn is_running_at(&self, now: DateTime<Utc>) -> bool {
        self.status == AbTestStatus::Running
            && self.started_at.is_none_or(|start| start <= now)
            && self.ended_at.is_none_or(|end| now < end)
    }

    /// Sum of all positive variant weights.
    pub fn total_weight(&self) -> u64 {
        self.variants
            .iter()
            .map(|v| v.weight.max(0) as u64)
            .sum()
    }

    /// Returns true if at least one variant can be drawn.
    pub fn is_selectable(&self) -> bool {
        self.total_weight() > 0
    }

    pub fn variant(&self, variant_id: i64) -> Option<&Variant> {
        self.variants.iter().find(|v| v.id == variant_id)
    }
}

/// An exposure of a visitor to a variant, recorded on every A/B-routed redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewImpression {
    pub test_id: i64,
    pub variant_id: i64,
    pub link_id: i64,
    pub fingerprint: String,
}

/// Aggregated counters for one variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantStats {
    pub variant_id: i64,
    pub name: String,
    pub destination_url: String,
    pub weight: i32,
    pub assignments: i64,
    pub impressions: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn variant(id: i64, weight: i32) -> Variant {
        Variant {
            id,
            test_id: 1,
            name: format!("v{id}"),
            destination_url: format!("https://example.com/{id}"),
            weight,
        }
    }

    fn test_with(variants: Vec<Variant>) -> AbTest {
        AbTest {
            id: 1,
            link_id: 1,
            name: "landing".to_string(),
            status: AbTestStatus::Running,
            started_at: None,
            ended_at: None,
            variants,
        }
    }

    #[test]
    fn test_running_window() {
        let now = Utc::now();
        let mut test = test_with(vec![variant(1, 1)]);
        assert!(test.is_running_at(now));

        test.started_at = Some(now + Duration::minutes(5));
        assert!(!test.is_running_at(now));

        test.started_at = Some(now - Duration::minutes(5));
        test.ended_at = Some(now);
        assert!(!test.is_running_at(now));

        test.ended_at = Some(now + Duration::minutes(5));
        assert!(test.is_running_at(now));

        test.status = AbTestStatus::Stopped;
        assert!(!test.is_running_at(now));
    }

    #[test]
    fn test_total_weight_ignores_negative_values() {
        let test = test_with(vec![variant(1, 3), variant(2, -4), variant(3, 0)]);
        assert_eq!(test.total_weight(), 3);
        assert!(test.is_selectable());
    }

    #[test]
    fn test_all_zero_weights_not_selectable() {
        assert!(!test_with(vec![variant(1, 0), variant(2, 0)]).is_selectable());
        assert!(!test_with(vec![]).is_selectable());
    }

    #[test]
    fn test_variant_lookup() {
        let test = test_with(vec![variant(7, 1), variant(9, 1)]);
        assert_eq!(test.variant(9).unwrap().id, 9);
        assert!(test.variant(8).is_none());
    }
}
