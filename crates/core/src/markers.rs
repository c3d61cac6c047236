//! DOM contract between server-rendered markup and the signup controller.
//!
//! The data attributes are the only channel between the two, so the site
//! renders exactly these names and the client looks for exactly these names.
//! Message regions are not marked: their ids are derived from the owning
//! form or modal id.

/// Wrapper around an email signup form.
pub const SIGNUP_FORM: &str = "data-signup-form";
/// On the form wrapper: selector of the profile modal to open.
pub const MODAL_TARGET: &str = "data-modal-target";
/// On the form wrapper: server action that registers the email.
pub const ACTION_REGISTER: &str = "data-action-register";
/// On the form wrapper, the modal, and token fields: the token action name.
pub const TOKEN_ACTION: &str = "data-token-action";
/// Element holding the email input and submit control; hidden after registration.
pub const INPUT_WRAPPER: &str = "data-input-wrapper";

/// Profile modal root.
pub const SIGNUP_MODAL: &str = "data-signup-modal";
/// On the modal: server action that updates the profile.
pub const ACTION_UPDATE: &str = "data-action-update";
/// On the modal: id of the originating email form.
pub const TARGET_FORM_ID: &str = "data-target-form-id";
/// The profile form inside the modal; scopes the profile fields.
pub const PROFILE_FORM: &str = "data-profile-form";
/// Hidden input inside the modal that receives the account identifier.
pub const USER_ID_INPUT: &str = "data-user-id-input";
/// Close button or overlay of a modal; a click dismisses it.
pub const MODAL_CLOSE: &str = "data-modal-close";
/// Marks the overlay among the close controls.
pub const MODAL_OVERLAY: &str = "data-modal-overlay";

/// Busy label of a submit control.
pub const SUBMIT_WAIT: &str = "data-wait";
/// Optional delay, in milliseconds, before a navigation link loads.
pub const AJAX_DELAY: &str = "data-ajax-delay";

/// Class that hides an element.
pub const HIDDEN_CLASS: &str = "u-hidden";

/// Id of a form's success message region.
#[must_use]
pub fn success_region_id(form_id: &str) -> String {
    format!("{form_id}-success")
}

/// Id of a form's failure message region.
#[must_use]
pub fn failure_region_id(form_id: &str) -> String {
    format!("{form_id}-failure")
}

/// Id of a modal's failure message region.
#[must_use]
pub fn modal_failure_region_id(modal_id: &str) -> String {
    format!("{modal_id}-failure")
}

/// Id of the profile modal paired with a form.
#[must_use]
pub fn modal_id_for(form_id: &str) -> String {
    format!("{form_id}-modal")
}
