//! Two-step signup: email capture, then a profile modal.
//!
//! Step one posts the email to the form's register action and, on success,
//! opens the paired modal with the new account id in its hidden field. Step
//! two posts the names with the token from the original form and reports
//! success back in that form's success region.

mod discover;
mod view;

use url::Url;

use marquee_core::ajax::{
    ACTION_FIELD, EMAIL_FIELD, FIRST_NAME_FIELD, LAST_NAME_FIELD, TOKEN_FIELD, USER_ID_FIELD,
};
use marquee_core::{AccountId, AjaxResponse};

use crate::error::{ClientConfigError, DiscoveryError, RejectionKind, SignupError};
use crate::transport::Transport;

pub use discover::discover;
pub use view::{
    Dismissal, Focusable, MessageRegion, ProfileModal, SignupForm, SubmitControl, TokenField,
};

const REGISTRATION_FAILED: &str = "Registration failed. Please try again.";
const REGISTRATION_NETWORK_ERROR: &str = "A network error occurred. Please check your connection.";
const PROFILE_UPDATED: &str = "Profile updated successfully!";
const PROFILE_FAILED: &str = "Could not save details.";
const PROFILE_NETWORK_ERROR: &str = "A network error occurred.";

/// A parsed response and the status it came with.
struct Reply {
    status: u16,
    body: AjaxResponse,
}

/// Drives the signup forms and profile modals of one page.
///
/// Each form has its own busy flag (its submit control); nothing stops two
/// different forms from submitting at once.
pub struct SignupController<T> {
    endpoint: Url,
    transport: T,
    forms: Vec<SignupForm>,
    modals: Vec<ProfileModal>,
    active_modal: Option<String>,
}

// Form and modal indices come from `position` on vectors that never change size.
#[allow(clippy::indexing_slicing)]
impl<T: Transport> SignupController<T> {
    #[must_use]
    pub const fn new(
        endpoint: Url,
        transport: T,
        forms: Vec<SignupForm>,
        modals: Vec<ProfileModal>,
    ) -> Self {
        Self {
            endpoint,
            transport,
            forms,
            modals,
            active_modal: None,
        }
    }

    /// Discover forms and modals in a rendered page.
    ///
    /// # Errors
    ///
    /// Returns `DiscoveryError` for a form or modal without an id.
    pub fn discover(document: &str, endpoint: Url, transport: T) -> Result<Self, DiscoveryError> {
        let (forms, modals) = discover(document)?;
        tracing::debug!(
            forms = forms.len(),
            modals = modals.len(),
            "signup markup discovered"
        );
        Ok(Self::new(endpoint, transport, forms, modals))
    }

    #[must_use]
    pub fn forms(&self) -> &[SignupForm] {
        &self.forms
    }

    #[must_use]
    pub fn form(&self, form_id: &str) -> Option<&SignupForm> {
        self.forms.iter().find(|f| f.form_id == form_id)
    }

    pub fn form_mut(&mut self, form_id: &str) -> Option<&mut SignupForm> {
        self.forms.iter_mut().find(|f| f.form_id == form_id)
    }

    #[must_use]
    pub fn modal(&self, modal_id: &str) -> Option<&ProfileModal> {
        self.modals.iter().find(|m| m.id == modal_id)
    }

    pub fn modal_mut(&mut self, modal_id: &str) -> Option<&mut ProfileModal> {
        self.modals.iter_mut().find(|m| m.id == modal_id)
    }

    /// Id of the modal currently open, if any.
    #[must_use]
    pub fn active_modal(&self) -> Option<&str> {
        self.active_modal.as_deref()
    }

    fn form_index(&self, form_id: &str) -> Result<usize, SignupError> {
        self.forms
            .iter()
            .position(|f| f.form_id == form_id)
            .ok_or_else(|| SignupError::UnknownForm(form_id.to_owned()))
    }

    fn modal_index(&self, modal_id: &str) -> Result<usize, SignupError> {
        self.modals
            .iter()
            .position(|m| m.id == modal_id)
            .ok_or_else(|| SignupError::UnknownModal(modal_id.to_owned()))
    }

    /// Submit the email form `form_id`.
    ///
    /// Every outcome is reflected in the form or modal before this returns.
    ///
    /// # Errors
    ///
    /// Returns `SignupError` for missing markup, a rejection, or a failed
    /// request.
    #[tracing::instrument(skip(self))]
    pub async fn submit_email(&mut self, form_id: &str) -> Result<AccountId, SignupError> {
        let form_index = self.form_index(form_id)?;
        let (fields, modal_index) = match self.registration_request(form_index) {
            Ok(prepared) => prepared,
            Err(error) => {
                tracing::error!(%error, "signup form is missing required elements");
                self.forms[form_index].show_failure(Some(error.user_message()));
                return Err(error.into());
            }
        };

        let form = &mut self.forms[form_index];
        form.set_busy(true);
        form.clear_messages();

        let reply = self.post(&fields).await;
        let result = self.finish_registration(form_index, modal_index, reply);

        self.forms[form_index].set_busy(false);
        result
    }

    fn registration_request(
        &self,
        form_index: usize,
    ) -> Result<(Vec<(String, String)>, usize), ClientConfigError> {
        let form = &self.forms[form_index];
        let form_id = || form.form_id.clone();

        let email = form
            .email_input
            .as_ref()
            .ok_or_else(|| ClientConfigError::MissingEmailInput { form: form_id() })?;
        let token = form
            .registration_token()
            .ok_or_else(|| ClientConfigError::MissingToken { form: form_id() })?;
        let action = form
            .register_action
            .as_ref()
            .ok_or_else(|| ClientConfigError::MissingRegisterAction { form: form_id() })?;
        let target = form
            .modal_target
            .as_ref()
            .ok_or_else(|| ClientConfigError::MissingModalTarget { form: form_id() })?;

        let modal_index = form
            .modal_id
            .as_ref()
            .and_then(|id| self.modals.iter().position(|m| &m.id == id))
            .ok_or_else(|| ClientConfigError::ModalNotFound {
                selector: target.clone(),
            })?;

        let fields = vec![
            (ACTION_FIELD.to_owned(), action.clone()),
            (EMAIL_FIELD.to_owned(), email.clone()),
            (TOKEN_FIELD.to_owned(), token.value.clone()),
        ];
        Ok((fields, modal_index))
    }

    fn finish_registration(
        &mut self,
        form_index: usize,
        modal_index: usize,
        reply: Result<Reply, String>,
    ) -> Result<AccountId, SignupError> {
        let form = &mut self.forms[form_index];
        let reply = match reply {
            Ok(reply) => reply,
            Err(error) => {
                tracing::error!(%error, "email signup request failed");
                form.show_failure(Some(REGISTRATION_NETWORK_ERROR));
                return Err(SignupError::Network(error));
            }
        };

        if !reply.body.success {
            let message = reply
                .body
                .message()
                .unwrap_or(REGISTRATION_FAILED)
                .to_owned();
            form.show_failure(Some(&message));
            return Err(SignupError::Rejected {
                kind: RejectionKind::from_status(reply.status),
                message,
            });
        }

        form.hide_input_wrapper();

        let modal = &mut self.modals[modal_index];
        let stored = reply
            .body
            .data
            .user_id
            .ok_or(ClientConfigError::MissingAccountId)
            .and_then(|id| {
                if modal.store_account_id(id) {
                    Ok(id)
                } else {
                    Err(ClientConfigError::MissingUserIdField {
                        modal: modal.id.clone(),
                    })
                }
            });

        match stored {
            Ok(id) => {
                modal.open();
                self.active_modal = Some(modal.id.clone());
                tracing::info!(account_id = %id, modal = %modal.id, "account created, profile modal opened");
                Ok(id)
            }
            Err(error) => {
                tracing::error!(%error, "could not hand the account over to the profile modal");
                form.show_failure(Some(error.user_message()));
                Err(error.into())
            }
        }
    }

    /// Submit the profile form of `modal_id`.
    ///
    /// Returns the message shown in the original form's success region.
    ///
    /// # Errors
    ///
    /// Returns `SignupError` for missing markup, a rejection, or a failed
    /// request.
    #[tracing::instrument(skip(self))]
    pub async fn submit_profile(&mut self, modal_id: &str) -> Result<String, SignupError> {
        let modal_index = self.modal_index(modal_id)?;
        let (fields, form_index) = match self.profile_request(modal_index) {
            Ok(prepared) => prepared,
            Err(error) => {
                tracing::error!(%error, "profile modal is missing required elements");
                self.modals[modal_index].show_failure(error.user_message());
                return Err(error.into());
            }
        };

        let modal = &mut self.modals[modal_index];
        modal.set_busy(true);
        modal.hide_failure();

        let reply = self.post(&fields).await;
        let result = self.finish_profile(modal_index, form_index, reply);

        self.modals[modal_index].set_busy(false);
        result
    }

    fn profile_request(
        &self,
        modal_index: usize,
    ) -> Result<(Vec<(String, String)>, usize), ClientConfigError> {
        let modal = &self.modals[modal_index];
        let modal_id = || modal.id.clone();

        let action = modal
            .update_action
            .as_ref()
            .ok_or_else(|| ClientConfigError::MissingUpdateAction { modal: modal_id() })?;
        let form_id = modal
            .target_form_id
            .as_ref()
            .ok_or_else(|| ClientConfigError::MissingTargetFormId { modal: modal_id() })?;
        let token_action = modal
            .token_action
            .as_ref()
            .ok_or_else(|| ClientConfigError::MissingTokenAction { modal: modal_id() })?;

        let form_index = self
            .forms
            .iter()
            .position(|f| &f.form_id == form_id)
            .ok_or_else(|| ClientConfigError::OriginalFormNotFound {
                modal: modal.id.clone(),
                form: form_id.clone(),
            })?;

        // The token lives on the original form; the modal renders none.
        let token = self.forms[form_index]
            .token_for(Some(token_action))
            .ok_or_else(|| ClientConfigError::TokenNotFound {
                form: form_id.clone(),
                action: token_action.clone(),
            })?;

        let fields = vec![
            (ACTION_FIELD.to_owned(), action.clone()),
            (
                USER_ID_FIELD.to_owned(),
                modal.user_id.clone().unwrap_or_default(),
            ),
            (FIRST_NAME_FIELD.to_owned(), modal.first_name.clone()),
            (LAST_NAME_FIELD.to_owned(), modal.last_name.clone()),
            (TOKEN_FIELD.to_owned(), token.value.clone()),
        ];
        Ok((fields, form_index))
    }

    fn finish_profile(
        &mut self,
        modal_index: usize,
        form_index: usize,
        reply: Result<Reply, String>,
    ) -> Result<String, SignupError> {
        let modal = &mut self.modals[modal_index];
        let reply = match reply {
            Ok(reply) => reply,
            Err(error) => {
                tracing::error!(%error, "profile update request failed");
                modal.show_failure(PROFILE_NETWORK_ERROR);
                return Err(SignupError::Network(error));
            }
        };

        if !reply.body.success {
            let message = reply.body.message().unwrap_or(PROFILE_FAILED).to_owned();
            modal.show_failure(&message);
            return Err(SignupError::Rejected {
                kind: RejectionKind::from_status(reply.status),
                message,
            });
        }

        modal.close();
        if self.active_modal.as_deref() == Some(modal.id.as_str()) {
            self.active_modal = None;
        }

        let message = reply.body.message().unwrap_or(PROFILE_UPDATED).to_owned();
        self.forms[form_index].show_success(Some(&message));
        Ok(message)
    }

    /// Close a modal from its close button or overlay.
    ///
    /// # Errors
    ///
    /// Returns `SignupError::UnknownModal` if no such modal was discovered,
    /// or `SignupError::NoDismissControl` if its markup has no such control.
    pub fn dismiss(&mut self, modal_id: &str, how: Dismissal) -> Result<(), SignupError> {
        let index = self.modal_index(modal_id)?;
        if !self.modals[index].dismissals.contains(&how) {
            return Err(SignupError::NoDismissControl {
                modal: modal_id.to_owned(),
                how,
            });
        }
        tracing::debug!(modal = modal_id, ?how, "modal dismissed");
        self.close_modal(index);
        Ok(())
    }

    /// Handle a key press anywhere on the page.
    ///
    /// Escape closes the active modal if it is showing. Returns whether a
    /// modal was closed.
    pub fn handle_key(&mut self, key: &str) -> bool {
        if key != "Escape" {
            return false;
        }
        let Some(index) = self
            .active_modal
            .as_deref()
            .and_then(|id| self.modals.iter().position(|m| m.id == id))
        else {
            return false;
        };
        if self.modals[index].aria_hidden() {
            return false;
        }
        self.close_modal(index);
        true
    }

    fn close_modal(&mut self, index: usize) {
        let modal = &mut self.modals[index];
        modal.close();
        if self.active_modal.as_deref() == Some(modal.id.as_str()) {
            self.active_modal = None;
        }
    }

    async fn post(&self, fields: &[(String, String)]) -> Result<Reply, String> {
        let page = self
            .transport
            .post_form(&self.endpoint, fields)
            .await
            .map_err(|e| e.to_string())?;
        let body = serde_json::from_str::<AjaxResponse>(&page.body)
            .map_err(|e| format!("invalid response (status {}): {e}", page.status))?;
        Ok(Reply {
            status: page.status,
            body,
        })
    }
}
