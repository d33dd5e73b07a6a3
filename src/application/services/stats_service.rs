//! Click and A/B test reporting.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;

use crate::domain::entities::{AbTestStatus, VariantStats};
use crate::domain::repositories::{AbTestRepository, ClickRepository, LinkRepository};
use crate::error::AppError;

/// Click totals for one link, plus its latest A/B test if it has one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkReport {
    pub link_id: i64,
    pub code: String,
    pub original_url: String,
    pub is_active: bool,
    pub total_clicks: i64,
    pub ab_test: Option<TestReport>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestReport {
    pub test_id: i64,
    pub name: String,
    pub status: AbTestStatus,
    pub variants: Vec<VariantStats>,
}

/// Service backing `GET /api/stats/{code}` and `admin stats`.
pub struct StatsService {
    links: Arc<dyn LinkRepository>,
    clicks: Arc<dyn ClickRepository>,
    tests: Arc<dyn AbTestRepository>,
}

impl StatsService {
    pub fn new(
        links: Arc<dyn LinkRepository>,
        clicks: Arc<dyn ClickRepository>,
        tests: Arc<dyn AbTestRepository>,
    ) -> Self {
        Self {
            links,
            clicks,
            tests,
        }
    }

    /// Builds the report for a code or alias, counting clicks inside `[from, to]`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if `from` is after `to`.
    /// Returns [`AppError::NotFound`] if no link matches the code.
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn link_report(
        &self,
        code: &str,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<LinkReport, AppError> {
        if let (Some(from), Some(to)) = (from, to)
            && from > to
        {
            return Err(AppError::bad_request(
                "'from' must not be after 'to'",
                json!({ "from": from, "to": to }),
            ));
        }

        let link = self
            .links
            .find_by_code(code)
            .await?
            .ok_or_else(|| AppError::not_found("Link not found", json!({ "code": code })))?;

        let total_clicks = self.clicks.count_clicks(link.id, from, to).await?;

        let ab_test = match self.tests.find_latest_for_link(link.id).await? {
            Some(test) => Some(TestReport {
                test_id: test.id,
                name: test.name,
                status: test.status,
                variants: self.tests.variant_stats(test.id).await?,
            }),
            None => None,
        };

        Ok(LinkReport {
            link_id: link.id,
            code: link.code,
            original_url: link.original_url,
            is_active: link.is_active,
            total_clicks,
            ab_test,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{AbTest, Link};
    use crate::domain::repositories::{
        MockAbTestRepository, MockClickRepository, MockLinkRepository,
    };
    use chrono::Duration;

    fn links_with(link: Option<Link>) -> MockLinkRepository {
        let mut mock_repo = MockLinkRepository::new();
        mock_repo
            .expect_find_by_code()
            .returning(move |_| Ok(link.clone()));
        mock_repo
    }

    #[tokio::test]
    async fn test_report_without_ab_test() {
        let mut clicks = MockClickRepository::new();
        clicks
            .expect_count_clicks()
            .withf(|link_id, from, to| *link_id == 1 && from.is_none() && to.is_none())
            .returning(|_, _, _| Ok(42));
        let mut tests = MockAbTestRepository::new();
        tests.expect_find_latest_for_link().returning(|_| Ok(None));

        let service = StatsService::new(
            Arc::new(links_with(Some(Link::new(1, "abc", "https://example.com")))),
            Arc::new(clicks),
            Arc::new(tests),
        );

        let report = service.link_report("abc", None, None).await.unwrap();

        assert_eq!(report.total_clicks, 42);
        assert_eq!(report.code, "abc");
        assert!(report.ab_test.is_none());
    }

    #[tokio::test]
    async fn test_report_with_ab_test() {
        let mut clicks = MockClickRepository::new();
        clicks.expect_count_clicks().returning(|_, _, _| Ok(3));
        let mut tests = MockAbTestRepository::new();
        tests.expect_find_latest_for_link().returning(|_| {
            Ok(Some(AbTest {
                id: 9,
                link_id: 1,
                name: "hero".to_string(),
                status: AbTestStatus::Stopped,
                started_at: None,
                ended_at: None,
                variants: vec![],
            }))
        });
        tests
            .expect_variant_stats()
            .withf(|test_id| *test_id == 9)
            .returning(|_| {
                Ok(vec![VariantStats {
                    variant_id: 90,
                    name: "A".to_string(),
                    destination_url: "https://a.example.com".to_string(),
                    weight: 50,
                    assignments: 2,
                    impressions: 3,
                }])
            });

        let service = StatsService::new(
            Arc::new(links_with(Some(Link::new(1, "abc", "https://example.com")))),
            Arc::new(clicks),
            Arc::new(tests),
        );

        let report = service.link_report("abc", None, None).await.unwrap();
        let test = report.ab_test.unwrap();

        assert_eq!(test.status, AbTestStatus::Stopped);
        assert_eq!(test.variants[0].impressions, 3);
    }

    #[tokio::test]
    async fn test_report_unknown_link() {
        let service = StatsService::new(
            Arc::new(links_with(None)),
            Arc::new(MockClickRepository::new()),
            Arc::new(MockAbTestRepository::new()),
        );

        let result = service.link_report("missing", None, None).await;

        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_report_rejects_inverted_range() {
        let service = StatsService::new(
            Arc::new(MockLinkRepository::new()),
            Arc::new(MockClickRepository::new()),
            Arc::new(MockAbTestRepository::new()),
        );
        let now = Utc::now();

        let result = service
            .link_report("abc", Some(now), Some(now - Duration::days(1)))
            .await;

        assert!(matches!(result, Err(AppError::Validation { .. })));
    }
}
