//! Application error types and their HTTP mappings.
//!
//! - [`AppError`] - general service error used by repositories, services and the
//!   authenticated API. Renders as `{"error": {"code", "message", "details"}}`.
//! - [`RedirectError`] - outcome taxonomy of the redirect path. Renders as
//!   `{"error": "..."}` with an optional `requiresPassword` flag so clients can
//!   prompt for a link password.

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

#[derive(Serialize)]
struct ErrorInfo {
    code: &'static str,
    message: String,
    details: Value,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Validation { message: String, details: Value },
    #[error("{message}")]
    Unauthorized { message: String, details: Value },
    #[error("{message}")]
    NotFound { message: String, details: Value },
    #[error("{message}")]
    Conflict { message: String, details: Value },
    #[error("{message}")]
    Internal { message: String, details: Value },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }
    pub fn unauthorized(message: impl Into<String>, details: Value) -> Self {
        Self::Unauthorized {
            message: message.into(),
            details,
        }
    }
    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }
    pub fn conflict(message: impl Into<String>, details: Value) -> Self {
        Self::Conflict {
            message: message.into(),
            details,
        }
    }
    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match self {
            AppError::Validation { message, details } => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                message,
                details,
            ),
            AppError::Unauthorized { message, details } => {
                (StatusCode::UNAUTHORIZED, "unauthorized", message, details)
            }
            AppError::NotFound { message, details } => {
                (StatusCode::NOT_FOUND, "not_found", message, details)
            }
            AppError::Conflict { message, details } => {
                (StatusCode::CONFLICT, "conflict", message, details)
            }
            AppError::Internal { message, details } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                message,
                details,
            ),
        };

        let body = ErrorBody {
            error: ErrorInfo {
                code,
                message,
                details,
            },
        };

        let mut response = (status, Json(body)).into_response();
        // RFC 6750
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        if let Some(db) = e.as_database_error()
            && db.is_unique_violation()
        {
            return AppError::conflict(
                "Unique constraint violation",
                json!({ "constraint": db.constraint() }),
            );
        }

        tracing::error!("Database error: {}", e);
        AppError::internal("Database error", json!({}))
    }
}

/// Failure outcomes of redirect resolution.
///
/// Each variant short-circuits the pipeline in
/// [`crate::application::services::RedirectService::resolve`].
#[derive(Debug, thiserror::Error)]
pub enum RedirectError {
    #[error("Link not found")]
    NotFound,
    #[error("Link is no longer available")]
    Gone,
    #[error("Password required")]
    PasswordRequired,
    #[error("Invalid password")]
    Unauthorized,
    #[error(transparent)]
    Internal(#[from] AppError),
}

impl RedirectError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Gone => StatusCode::GONE,
            Self::PasswordRequired | Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short label used for metrics and logs.
    pub fn outcome(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Gone => "gone",
            Self::PasswordRequired => "password_required",
            Self::Unauthorized => "unauthorized",
            Self::Internal(_) => "error",
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RedirectErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    requires_password: Option<bool>,
}

impl IntoResponse for RedirectError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match &self {
            Self::Internal(source) => {
                tracing::error!("Redirect resolution failed: {:?}", source);
                RedirectErrorBody {
                    error: "Internal server error".to_string(),
                    requires_password: None,
                }
            }
            Self::PasswordRequired => RedirectErrorBody {
                error: self.to_string(),
                requires_password: Some(true),
            },
            _ => RedirectErrorBody {
                error: self.to_string(),
                requires_password: None,
            },
        };

        (
            status,
            [(header::CACHE_CONTROL, "private, no-store")],
            Json(body),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redirect_error_status_codes() {
        assert_eq!(RedirectError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(RedirectError::Gone.status(), StatusCode::GONE);
        assert_eq!(
            RedirectError::PasswordRequired.status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            RedirectError::Unauthorized.status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            RedirectError::Internal(AppError::internal("boom", json!({}))).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_password_required_body_flag() {
        let body = RedirectErrorBody {
            error: RedirectError::PasswordRequired.to_string(),
            requires_password: Some(true),
        };
        let value = serde_json::to_value(body).unwrap();
        assert_eq!(value["requiresPassword"], json!(true));

        let body = RedirectErrorBody {
            error: RedirectError::Unauthorized.to_string(),
            requires_password: None,
        };
        let value = serde_json::to_value(body).unwrap();
        assert!(value.get("requiresPassword").is_none());
    }

    #[test]
    fn test_unauthorized_sets_www_authenticate() {
        let response = AppError::unauthorized("Unauthorized", json!({})).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );
    }
}
