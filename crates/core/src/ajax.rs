//! Wire contract of the site's action endpoint.
//!
//! Both signup steps POST a form-encoded body to a single endpoint; the
//! `action` field selects the server handler and the token field carries the
//! anti-forgery token. Every handler answers with an [`AjaxResponse`].
//!
//! ```text
//! register:       action, email, _token                       -> {success, data: {message, userId?}}
//! update profile: action, user_id, first_name, last_name, _token -> {success, data: {message}}
//! ```

use serde::{Deserialize, Serialize};

use crate::AccountId;

/// Default path of the action endpoint.
pub const DEFAULT_ENDPOINT: &str = "/ajax";

/// Field naming the server action to run.
pub const ACTION_FIELD: &str = "action";
/// Field carrying the anti-forgery token.
pub const TOKEN_FIELD: &str = "_token";
/// Email field of the registration step.
pub const EMAIL_FIELD: &str = "email";
/// Account identifier field of the profile step.
pub const USER_ID_FIELD: &str = "user_id";
/// First name field of the profile step.
pub const FIRST_NAME_FIELD: &str = "first_name";
/// Last name field of the profile step.
pub const LAST_NAME_FIELD: &str = "last_name";

/// JSON envelope returned by every action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AjaxResponse {
    /// Whether the action succeeded.
    pub success: bool,
    /// Payload; message and optional account id.
    #[serde(default)]
    pub data: AjaxData,
}

/// Payload of an [`AjaxResponse`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AjaxData {
    /// User-facing message, shown verbatim by the client.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Identifier of the account created by the registration step.
    #[serde(rename = "userId", default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<AccountId>,
}

impl AjaxResponse {
    /// A successful response carrying a message.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: AjaxData {
                message: Some(message.into()),
                user_id: None,
            },
        }
    }

    /// A failed response carrying a message.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: AjaxData {
                message: Some(message.into()),
                user_id: None,
            },
        }
    }

    /// Attach the account identifier created by registration.
    #[must_use]
    pub const fn with_user_id(mut self, id: AccountId) -> Self {
        self.data.user_id = Some(id);
        self
    }

    /// The server-supplied message, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.data.message.as_deref()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_with_user_id_shape() {
        let response = AjaxResponse::success("Account created successfully!")
            .with_user_id(AccountId::new(42));
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"success": true, "data": {"message": "Account created successfully!", "userId": 42}})
        );
    }

    #[test]
    fn test_failure_omits_user_id() {
        let response = AjaxResponse::failure("This email address is already registered.");
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"success": false, "data": {"message": "This email address is already registered."}})
        );
    }

    #[test]
    fn test_missing_data_defaults() {
        let response: AjaxResponse = serde_json::from_str(r#"{"success":false}"#).unwrap();
        assert!(!response.success);
        assert_eq!(response.message(), None);
        assert_eq!(response.data.user_id, None);
    }
}
