//! Click event model for asynchronous click tracking.

use crate::domain::entities::{NewClick, RequestMeta};

/// An in-memory click event passed from the redirect path to the background worker.
///
/// Carries the already-resolved `link_id`, so the worker never needs another lookup.
///
/// # Usage Flow
///
/// 1. Built by [`crate::application::services::RedirectService`] after access checks pass
/// 2. Queued without blocking via [`crate::application::services::ClickTracker`]
/// 3. Persisted by [`crate::domain::click_worker::run_click_worker`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickEvent {
    pub link_id: i64,
    pub code: String,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
}

impl ClickEvent {
    /// Creates a click event from the resolved link and the request metadata.
    pub fn new(link_id: i64, code: impl Into<String>, request: &RequestMeta) -> Self {
        Self {
            link_id,
            code: code.into(),
            ip: request.ip_string(),
            user_agent: request.user_agent.clone(),
            referer: request.referer.clone(),
        }
    }
}

impl From<ClickEvent> for NewClick {
    fn from(event: ClickEvent) -> Self {
        NewClick {
            link_id: event.link_id,
            ip: event.ip,
            user_agent: event.user_agent,
            referer: event.referer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_click_event_creation_full() {
        let request = RequestMeta {
            ip: Some("192.168.1.1".parse().unwrap()),
            user_agent: Some("Mozilla/5.0".to_string()),
            referer: Some("https://google.com".to_string()),
            password: Some("secret".to_string()),
            country: None,
        };

        let event = ClickEvent::new(42, "abc123", &request);

        assert_eq!(event.link_id, 42);
        assert_eq!(event.code, "abc123");
        assert_eq!(event.ip, Some("192.168.1.1".to_string()));
        assert_eq!(event.user_agent, Some("Mozilla/5.0".to_string()));
        assert_eq!(event.referer, Some("https://google.com".to_string()));
    }

    #[test]
    fn test_click_event_creation_minimal() {
        let event = ClickEvent::new(7, "xyz", &RequestMeta::default());

        assert!(event.ip.is_none());
        assert!(event.user_agent.is_none());
        assert!(event.referer.is_none());
    }

    #[test]
    fn test_into_new_click() {
        let request = RequestMeta {
            ip: Some("10.0.0.1".parse().unwrap()),
            ..Default::default()
        };
        let new_click: NewClick = ClickEvent::new(3, "c", &request).into();

        assert_eq!(new_click.link_id, 3);
        assert_eq!(new_click.ip.as_deref(), Some("10.0.0.1"));
    }
}
