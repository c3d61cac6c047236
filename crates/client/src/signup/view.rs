//! In-memory model of the signup markup the controller mutates.

use marquee_core::AccountId;

const DEFAULT_WAIT_LABEL: &str = "Processing...";
const DEFAULT_SUBMIT_LABEL: &str = "Submit";

/// A success or failure message region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRegion {
    pub id: String,
    pub visible: bool,
    /// Text of the region's inner message element.
    pub text: String,
}

impl MessageRegion {
    #[must_use]
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            visible: false,
            text: text.into(),
        }
    }

    /// Show the region, replacing its text when a message is given.
    pub fn show(&mut self, message: Option<&str>) {
        if let Some(message) = message.filter(|m| !m.is_empty()) {
            message.clone_into(&mut self.text);
        }
        self.visible = true;
    }

    pub const fn hide(&mut self) {
        self.visible = false;
    }

    /// Value of `aria-hidden`.
    #[must_use]
    pub const fn aria_hidden(&self) -> bool {
        !self.visible
    }
}

/// The submit control of a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitControl {
    pub label: String,
    /// Label shown while busy, from `data-wait`.
    pub wait_label: Option<String>,
    pub disabled: bool,
    original_label: Option<String>,
}

impl SubmitControl {
    #[must_use]
    pub fn new(label: impl Into<String>, wait_label: Option<String>) -> Self {
        Self {
            label: label.into(),
            wait_label,
            disabled: false,
            original_label: None,
        }
    }

    /// Disable and swap to the waiting label.
    pub fn busy(&mut self) {
        let wait = self
            .wait_label
            .clone()
            .unwrap_or_else(|| DEFAULT_WAIT_LABEL.to_owned());
        self.original_label = Some(std::mem::replace(&mut self.label, wait));
        self.disabled = true;
    }

    /// Re-enable and put the original label back.
    pub fn restore(&mut self) {
        self.label = self
            .original_label
            .take()
            .filter(|label| !label.is_empty())
            .unwrap_or_else(|| DEFAULT_SUBMIT_LABEL.to_owned());
        self.disabled = false;
    }

    #[must_use]
    pub const fn is_busy(&self) -> bool {
        self.disabled
    }
}

/// A hidden anti-forgery token field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenField {
    /// Token action the field was issued for, if tagged.
    pub action: Option<String>,
    pub value: String,
}

/// An email signup form and its wrapper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignupForm {
    pub form_id: String,
    /// Selector of the profile modal to open.
    pub modal_target: Option<String>,
    /// Id of the discovered modal `modal_target` selects.
    pub modal_id: Option<String>,
    pub register_action: Option<String>,
    pub token_action: Option<String>,
    /// Current value of the email input; `None` when the form has none.
    pub email_input: Option<String>,
    pub tokens: Vec<TokenField>,
    pub submit: Option<SubmitControl>,
    /// Visibility of the email input region; `None` when the form has none.
    pub input_wrapper_visible: Option<bool>,
    pub success: Option<MessageRegion>,
    pub failure: Option<MessageRegion>,
}

impl SignupForm {
    /// Type into the email input, if there is one.
    pub fn set_email(&mut self, email: impl Into<String>) {
        if let Some(input) = &mut self.email_input {
            *input = email.into();
        }
    }

    /// Token to send with the registration request.
    ///
    /// Prefers a token tagged with this form's token action.
    #[must_use]
    pub fn registration_token(&self) -> Option<&TokenField> {
        self.token_for(self.token_action.as_deref())
    }

    /// Token tagged with `action`, falling back to the first token field.
    #[must_use]
    pub fn token_for(&self, action: Option<&str>) -> Option<&TokenField> {
        action
            .and_then(|action| {
                self.tokens
                    .iter()
                    .find(|t| t.action.as_deref() == Some(action) && !t.value.is_empty())
            })
            .or_else(|| self.tokens.first())
    }

    pub(crate) fn show_success(&mut self, message: Option<&str>) {
        if let Some(failure) = &mut self.failure {
            failure.hide();
        }
        match &mut self.success {
            Some(success) => success.show(message),
            None => tracing::warn!(form = %self.form_id, "success message region not found"),
        }
    }

    pub(crate) fn show_failure(&mut self, message: Option<&str>) {
        if let Some(success) = &mut self.success {
            success.hide();
        }
        match &mut self.failure {
            Some(failure) => failure.show(message),
            None => tracing::warn!(form = %self.form_id, "failure message region not found"),
        }
    }

    pub(crate) fn clear_messages(&mut self) {
        for region in [&mut self.success, &mut self.failure].into_iter().flatten() {
            region.hide();
        }
    }

    pub(crate) fn hide_input_wrapper(&mut self) {
        if let Some(visible) = &mut self.input_wrapper_visible {
            *visible = false;
        }
    }

    pub(crate) fn set_busy(&mut self, busy: bool) {
        if let Some(submit) = &mut self.submit {
            if busy {
                submit.busy();
            } else {
                submit.restore();
            }
        }
    }
}

/// How a modal was dismissed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dismissal {
    CloseButton,
    Overlay,
}

/// A control that can take focus inside a modal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Focusable {
    pub tag: String,
    pub id: Option<String>,
    pub name: Option<String>,
}

/// The profile modal paired with a signup form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileModal {
    pub id: String,
    pub update_action: Option<String>,
    pub token_action: Option<String>,
    pub target_form_id: Option<String>,
    pub visible: bool,
    /// Hidden account identifier field; `None` when the modal has none.
    pub user_id: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub submit: Option<SubmitControl>,
    pub failure: Option<MessageRegion>,
    /// Focusable controls in document order.
    pub focusables: Vec<Focusable>,
    /// Close controls present in the markup.
    pub dismissals: Vec<Dismissal>,
    focused: Option<usize>,
}

impl ProfileModal {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            update_action: None,
            token_action: None,
            target_form_id: None,
            visible: false,
            user_id: None,
            first_name: String::new(),
            last_name: String::new(),
            submit: None,
            failure: None,
            focusables: Vec::new(),
            dismissals: Vec::new(),
            focused: None,
        }
    }

    /// Value of `aria-hidden`.
    #[must_use]
    pub const fn aria_hidden(&self) -> bool {
        !self.visible
    }

    /// Type into the name fields.
    pub fn set_names(&mut self, first: impl Into<String>, last: impl Into<String>) {
        self.first_name = first.into();
        self.last_name = last.into();
    }

    /// The control holding focus, if any.
    #[must_use]
    pub fn focused(&self) -> Option<&Focusable> {
        self.focused.and_then(|i| self.focusables.get(i))
    }

    /// Store the account identifier; fails when the field is missing.
    pub(crate) fn store_account_id(&mut self, id: AccountId) -> bool {
        match &mut self.user_id {
            Some(field) => {
                *field = id.to_string();
                true
            }
            None => false,
        }
    }

    /// Display the modal and focus its first focusable control.
    pub fn open(&mut self) {
        self.visible = true;
        self.focused = (!self.focusables.is_empty()).then_some(0);
    }

    /// Hide the modal and clear its failure message.
    pub fn close(&mut self) {
        self.visible = false;
        self.focused = None;
        self.hide_failure();
    }

    pub(crate) fn show_failure(&mut self, message: &str) {
        match &mut self.failure {
            Some(failure) => failure.show(Some(message)),
            None => tracing::warn!(modal = %self.id, "modal failure region not found"),
        }
    }

    pub(crate) fn hide_failure(&mut self) {
        if let Some(failure) = &mut self.failure {
            failure.hide();
        }
    }

    pub(crate) fn set_busy(&mut self, busy: bool) {
        if let Some(submit) = &mut self.submit {
            if busy {
                submit.busy();
            } else {
                submit.restore();
            }
        }
    }
}
