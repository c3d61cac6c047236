//! The action endpoint.
//!
//! `POST /ajax` takes a form-encoded body whose `action` field selects the
//! handler. Every answer is an [`AjaxResponse`] envelope; failures carry a
//! non-2xx status and the message the client shows verbatim.

use axum::{
    Form, Json,
    extract::{State, rejection::FormRejection},
};
use serde::Deserialize;
use tracing::instrument;

use marquee_core::AjaxResponse;

use crate::error::{ActionError, add_breadcrumb};
use crate::services::SignupService;
use crate::services::signup::{PROFILE_UPDATED_MESSAGE, REGISTERED_MESSAGE};
use crate::state::AppState;

/// Fields of every action request. Each action reads the ones it needs.
#[derive(Debug, Default, Deserialize)]
pub struct ActionForm {
    pub action: Option<String>,
    pub email: Option<String>,
    pub user_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(rename = "_token")]
    pub token: Option<String>,
}

/// Dispatch an action request.
///
/// # Errors
///
/// Returns `ActionError` for an unknown action, a malformed body, or a
/// failed action.
#[instrument(skip_all, fields(action))]
pub async fn dispatch(
    State(state): State<AppState>,
    form: Result<Form<ActionForm>, FormRejection>,
) -> Result<Json<AjaxResponse>, ActionError> {
    let Form(form) = form.map_err(|e| {
        tracing::debug!(error = %e, "Unreadable action body");
        ActionError::UnknownAction
    })?;

    let action = form.action.as_deref().map(str::trim).unwrap_or_default();
    tracing::Span::current().record("action", action);

    let settings = state.signup();
    let service = SignupService::new(state.accounts(), state.tokens(), settings);

    if action == settings.register_action {
        let account = service
            .register(form.email.as_deref(), form.token.as_deref())
            .await?;
        add_breadcrumb("signup", "Email registered");
        Ok(Json(
            AjaxResponse::success(REGISTERED_MESSAGE).with_user_id(account.id),
        ))
    } else if action == settings.update_action {
        service
            .update_profile(
                form.user_id.as_deref(),
                form.first_name.as_deref(),
                form.last_name.as_deref(),
                form.token.as_deref(),
            )
            .await?;
        add_breadcrumb("signup", "Profile updated");
        Ok(Json(AjaxResponse::success(PROFILE_UPDATED_MESSAGE)))
    } else {
        Err(ActionError::UnknownAction)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use tower::ServiceExt;

    use marquee_core::AccountId;

    use crate::routes::test_support::{state, token};
    use crate::routes::routes;

    use super::*;

    async fn post(state: &AppState, body: String) -> (StatusCode, AjaxResponse) {
        let response = routes()
            .with_state(state.clone())
            .oneshot(
                Request::post("/ajax")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn register_body(email: &str, token: &str) -> String {
        format!(
            "action=register_email&email={}&_token={token}",
            email.replace('@', "%40")
        )
    }

    #[tokio::test]
    async fn test_register_returns_user_id() {
        let state = state();
        let (status, body) = post(&state, register_body("user@example.com", &token(&state))).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.success);
        assert_eq!(body.message(), Some("Account created successfully!"));
        assert_eq!(body.data.user_id, Some(AccountId::new(1)));
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let state = state();
        let token = token(&state);
        post(&state, register_body("duplicate@example.com", &token)).await;

        let (status, body) = post(&state, register_body("duplicate@example.com", &token)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(!body.success);
        assert_eq!(
            body.message(),
            Some("This email address is already registered.")
        );
    }

    #[tokio::test]
    async fn test_invalid_token_rejected_without_mutation() {
        let state = state();
        let (status, body) = post(&state, register_body("user@example.com", "0000")).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(
            body.message(),
            Some("Security check failed. Please refresh the page and try again.")
        );
        let email = marquee_core::Email::parse("user@example.com").unwrap();
        assert!(state.accounts().find_by_email(&email).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_invalid_email() {
        let state = state();
        let (status, body) = post(&state, register_body("not-an-email", &token(&state))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.message(), Some("Please provide a valid email address."));
    }

    #[tokio::test]
    async fn test_update_profile_for_account_42() {
        let state = state();
        let token = token(&state);
        for n in 1..=42 {
            let email = marquee_core::Email::parse(&format!("user{n}@example.com")).unwrap();
            state.accounts().create(&email, "hash").await.unwrap();
        }

        let (status, body) = post(
            &state,
            format!("action=update_user_details&user_id=42&first_name=Ada&last_name=Lovelace&_token={token}"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.success);
        assert_eq!(body.message(), Some("Profile updated successfully!"));
        let account = state.accounts().get(AccountId::new(42)).await.unwrap().unwrap();
        assert_eq!(account.first_name, "Ada");
        assert_eq!(account.last_name, "Lovelace");
    }

    #[tokio::test]
    async fn test_update_profile_errors() {
        let state = state();
        let token = token(&state);

        let (status, body) = post(
            &state,
            format!("action=update_user_details&user_id=abc&_token={token}"),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.message(), Some("Invalid user identifier."));

        let (status, body) = post(
            &state,
            format!("action=update_user_details&user_id=7&_token={token}"),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.message(), Some("User not found."));
    }

    #[tokio::test]
    async fn test_unknown_action() {
        let state = state();
        let (status, body) = post(&state, "action=delete_everything".to_owned()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.message(), Some("Unknown action."));
    }
}
