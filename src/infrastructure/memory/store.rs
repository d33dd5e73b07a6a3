//! In-memory store implementing every repository trait.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use tokio::sync::Mutex;

use crate::domain::entities::{
    AbTest, Click, Link, LinkTarget, NewClick, NewImpression, VariantStats,
};
use crate::domain::repositories::{
    AbTestRepository, ApiToken, ClickRepository, LinkRepository, TokenRepository,
};
use crate::error::AppError;

#[derive(Debug, Default)]
struct Data {
    next_id: i64,
    links: Vec<Link>,
    targets: Vec<LinkTarget>,
    tests: Vec<AbTest>,
    /// `(test_id, fingerprint)` to variant id.
    assignments: HashMap<(i64, String), i64>,
    impressions: Vec<NewImpression>,
    clicks: Vec<Click>,
    tokens: Vec<ApiToken>,
}

impl Data {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// An in-memory store.
///
/// Cloning shares the underlying data. Identifiers passed to the `insert_*`
/// helpers are replaced with fresh ones.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    data: Arc<Mutex<Data>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_link(&self, mut link: Link) -> Link {
        let mut data = self.data.lock().await;
        link.id = data.next_id();
        data.links.push(link.clone());
        link
    }

    /// Stores a target for `target.link_id`.
    pub async fn insert_target(&self, mut target: LinkTarget) -> LinkTarget {
        let mut data = self.data.lock().await;
        target.id = data.next_id();
        data.targets.push(target.clone());
        target
    }

    /// Stores a test and its variants for `test.link_id`.
    pub async fn insert_ab_test(&self, mut test: AbTest) -> AbTest {
        let mut data = self.data.lock().await;
        test.id = data.next_id();
        for variant in &mut test.variants {
            variant.id = data.next_id();
            variant.test_id = test.id;
        }
        data.tests.push(test.clone());
        test
    }

    pub async fn clicks(&self) -> Vec<Click> {
        self.data.lock().await.clicks.clone()
    }

    pub async fn impressions(&self) -> Vec<NewImpression> {
        self.data.lock().await.impressions.clone()
    }
}

#[async_trait]
impl LinkRepository for MemoryStore {
    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError> {
        let data = self.data.lock().await;
        let by_code = data.links.iter().find(|l| l.code == code);
        let by_alias = || {
            data.links
                .iter()
                .find(|l| l.custom_alias.as_deref() == Some(code))
        };

        Ok(by_code.or_else(by_alias).cloned())
    }

    async fn find_targets(&self, link_id: i64) -> Result<Vec<LinkTarget>, AppError> {
        let mut targets: Vec<LinkTarget> = self
            .data
            .lock()
            .await
            .targets
            .iter()
            .filter(|t| t.link_id == link_id)
            .cloned()
            .collect();
        targets.sort_by_key(|t| (t.priority, t.id));

        Ok(targets)
    }

    async fn set_password(
        &self,
        code: &str,
        password_hash: Option<String>,
    ) -> Result<bool, AppError> {
        let mut data = self.data.lock().await;
        match data.links.iter_mut().find(|l| l.code == code) {
            Some(link) => {
                link.password_hash = password_hash;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

#[async_trait]
impl AbTestRepository for MemoryStore {
    async fn find_active_for_link(
        &self,
        link_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<AbTest>, AppError> {
        Ok(self
            .data
            .lock()
            .await
            .tests
            .iter()
            .filter(|t| t.link_id == link_id && t.is_running_at(now))
            .max_by_key(|t| t.id)
            .cloned())
    }

    async fn find_latest_for_link(&self, link_id: i64) -> Result<Option<AbTest>, AppError> {
        Ok(self
            .data
            .lock()
            .await
            .tests
            .iter()
            .filter(|t| t.link_id == link_id)
            .max_by_key(|t| t.id)
            .cloned())
    }

    async fn find_assignment(
        &self,
        test_id: i64,
        fingerprint: &str,
    ) -> Result<Option<i64>, AppError> {
        Ok(self
            .data
            .lock()
            .await
            .assignments
            .get(&(test_id, fingerprint.to_string()))
            .copied())
    }

    async fn get_or_create_assignment(
        &self,
        test_id: i64,
        fingerprint: &str,
        variant_id: i64,
    ) -> Result<i64, AppError> {
        let mut data = self.data.lock().await;
        Ok(*data
            .assignments
            .entry((test_id, fingerprint.to_string()))
            .or_insert(variant_id))
    }

    async fn replace_assignment(
        &self,
        test_id: i64,
        fingerprint: &str,
        variant_id: i64,
    ) -> Result<(), AppError> {
        self.data
            .lock()
            .await
            .assignments
            .insert((test_id, fingerprint.to_string()), variant_id);
        Ok(())
    }

    async fn record_impression(&self, impression: NewImpression) -> Result<(), AppError> {
        self.data.lock().await.impressions.push(impression);
        Ok(())
    }

    async fn variant_stats(&self, test_id: i64) -> Result<Vec<VariantStats>, AppError> {
        let data = self.data.lock().await;
        let Some(test) = data.tests.iter().find(|t| t.id == test_id) else {
            return Ok(Vec::new());
        };

        Ok(test
            .variants
            .iter()
            .map(|v| VariantStats {
                variant_id: v.id,
                name: v.name.clone(),
                destination_url: v.destination_url.clone(),
                weight: v.weight,
                assignments: data
                    .assignments
                    .iter()
                    .filter(|((t, _), variant)| *t == test_id && **variant == v.id)
                    .count() as i64,
                impressions: data
                    .impressions
                    .iter()
                    .filter(|i| i.variant_id == v.id)
                    .count() as i64,
            })
            .collect())
    }
}

#[async_trait]
impl ClickRepository for MemoryStore {
    async fn record_click(&self, new_click: NewClick) -> Result<Click, AppError> {
        let mut data = self.data.lock().await;
        let click = Click {
            id: data.next_id(),
            link_id: new_click.link_id,
            clicked_at: Utc::now(),
            ip: new_click.ip,
            user_agent: new_click.user_agent,
            referer: new_click.referer,
        };
        data.clicks.push(click.clone());
        Ok(click)
    }

    async fn count_clicks(
        &self,
        link_id: i64,
        from_date: Option<DateTime<Utc>>,
        to_date: Option<DateTime<Utc>>,
    ) -> Result<i64, AppError> {
        Ok(self
            .data
            .lock()
            .await
            .clicks
            .iter()
            .filter(|c| c.link_id == link_id)
            .filter(|c| from_date.is_none_or(|from| c.clicked_at >= from))
            .filter(|c| to_date.is_none_or(|to| c.clicked_at <= to))
            .count() as i64)
    }
}

#[async_trait]
impl TokenRepository for MemoryStore {
    async fn validate_token(&self, token_hash: &str) -> Result<bool, AppError> {
        Ok(self
            .data
            .lock()
            .await
            .tokens
            .iter()
            .any(|t| t.token_hash == token_hash && t.revoked_at.is_none()))
    }

    async fn update_last_used(&self, token_hash: &str) -> Result<(), AppError> {
        let mut data = self.data.lock().await;
        if let Some(token) = data
            .tokens
            .iter_mut()
            .find(|t| t.token_hash == token_hash && t.revoked_at.is_none())
        {
            token.last_used_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn create_token(&self, name: &str, token_hash: &str) -> Result<ApiToken, AppError> {
        let mut data = self.data.lock().await;
        if data
            .tokens
            .iter()
            .any(|t| t.name == name || t.token_hash == token_hash)
        {
            return Err(AppError::conflict(
                "Unique constraint violation",
                json!({ "constraint": "api_tokens" }),
            ));
        }

        let token = ApiToken {
            id: data.next_id(),
            name: name.to_string(),
            token_hash: token_hash.to_string(),
            created_at: Utc::now(),
            last_used_at: None,
            revoked_at: None,
        };
        data.tokens.push(token.clone());
        Ok(token)
    }

    async fn list_tokens(&self) -> Result<Vec<ApiToken>, AppError> {
        let mut tokens = self.data.lock().await.tokens.clone();
        tokens.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(tokens)
    }

    async fn revoke_by_name(&self, name: &str) -> Result<bool, AppError> {
        let mut data = self.data.lock().await;
        match data
            .tokens
            .iter_mut()
            .find(|t| t.name == name && t.revoked_at.is_none())
        {
            Some(token) => {
                token.revoked_at = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
