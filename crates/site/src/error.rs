//! Unified error handling with Sentry integration.
//!
//! Two error types reach the client:
//!
//! - [`AppError`] for page routes: plain-text status responses, server errors
//!   captured to Sentry with details hidden.
//! - [`ActionError`] for the action endpoint: always the JSON envelope
//!   `{"success": false, "data": {"message": ...}}` with a message the signup
//!   controller shows verbatim.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use marquee_core::AjaxResponse;

use crate::content::ContentError;
use crate::db::RepositoryError;

/// Application-level error type for page routes.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Content could not be loaded or rendered.
    #[error("Content error: {0}")]
    Content(#[from] ContentError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(
            self,
            Self::Database(_) | Self::Content(_) | Self::Internal(_)
        ) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Database(_) | Self::Content(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Database(_) | Self::Content(_) | Self::Internal(_) => {
                "Internal server error".to_string()
            }
            _ => self.to_string(),
        };

        (status, message).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

// =============================================================================
// Action endpoint errors
// =============================================================================

/// A failed server action.
///
/// The `Display` text of each variant is the message sent to the browser.
#[derive(Debug, Error)]
pub enum ActionError {
    /// Anti-forgery token missing, expired, or issued for another action.
    #[error("Security check failed. Please refresh the page and try again.")]
    InvalidToken,

    #[error("Please provide a valid email address.")]
    InvalidEmail,

    #[error("This email address is already registered.")]
    DuplicateAccount,

    /// The account store refused or failed the insert.
    #[error("Could not create account. Please try again later.")]
    CreateFailed(#[source] RepositoryError),

    /// The generated password could not be hashed.
    #[error("Could not create account. Please try again later.")]
    PasswordHash,

    /// `user_id` missing, non-numeric, or not positive.
    #[error("Invalid user identifier.")]
    InvalidIdentifier,

    #[error("User not found.")]
    AccountNotFound,

    /// The `action` field names no handler.
    #[error("Unknown action.")]
    UnknownAction,

    /// Any other store failure.
    #[error("Something went wrong. Please try again.")]
    Internal(#[from] RepositoryError),
}

impl ActionError {
    /// HTTP status of the failure response.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidToken => StatusCode::FORBIDDEN,
            Self::InvalidEmail | Self::InvalidIdentifier | Self::UnknownAction => {
                StatusCode::BAD_REQUEST
            }
            Self::DuplicateAccount => StatusCode::CONFLICT,
            Self::AccountNotFound => StatusCode::NOT_FOUND,
            Self::CreateFailed(_) | Self::PasswordHash | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ActionError {
    fn into_response(self) -> Response {
        match &self {
            Self::CreateFailed(source) | Self::Internal(source) => {
                let event_id = sentry::capture_error(source);
                tracing::error!(
                    error = %source,
                    sentry_event_id = %event_id,
                    "Action failed"
                );
            }
            Self::PasswordHash => tracing::error!("Password hashing failed"),
            _ => tracing::info!(reason = %self, "Action rejected"),
        }

        (self.status(), Json(AjaxResponse::failure(self.to_string()))).into_response()
    }
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
pub fn add_breadcrumb(category: &str, message: &str) {
    sentry::add_breadcrumb(sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_status_codes() {
        let response = AppError::NotFound("page".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = AppError::Internal("boom".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_action_error_statuses() {
        assert_eq!(ActionError::InvalidToken.status(), StatusCode::FORBIDDEN);
        assert_eq!(ActionError::InvalidEmail.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ActionError::DuplicateAccount.status(), StatusCode::CONFLICT);
        assert_eq!(ActionError::AccountNotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ActionError::Internal(RepositoryError::NotFound).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_action_error_renders_envelope() {
        let response = ActionError::DuplicateAccount.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let envelope: AjaxResponse = serde_json::from_slice(&body).unwrap();
        assert!(!envelope.success);
        assert_eq!(
            envelope.message(),
            Some("This email address is already registered.")
        );
    }

    #[tokio::test]
    async fn test_internal_details_are_hidden() {
        let response =
            ActionError::CreateFailed(RepositoryError::DataCorruption("bad row".into()))
                .into_response();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.contains("Could not create account. Please try again later."));
        assert!(!text.contains("bad row"));
    }
}
