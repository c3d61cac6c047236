//! Client error types.
//!
//! Navigation failures never surface to the user as messages: every one of
//! them ends in a native navigation to the target URL. Signup failures always
//! end in a message region; [`ClientConfigError::user_message`] and the
//! server's own message decide the text.

use thiserror::Error;

use crate::signup::Dismissal;

/// Errors raised by a [`crate::Transport`].
#[derive(Debug, Error)]
pub enum TransportError {
    /// The HTTP client failed to send or read the request.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The connection could not be made or was dropped.
    #[error("connection failed: {0}")]
    Connection(String),
}

/// Errors on the navigation path.
#[derive(Debug, Error)]
pub enum NavigationError {
    /// An `ignoreUrlPatterns` entry is not a valid regex.
    #[error("invalid ignore pattern {pattern:?}: {source}")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// Why it failed to compile.
        source: regex::Error,
    },

    /// A configured selector cannot be parsed.
    #[error("invalid selector {selector:?}: {reason}")]
    InvalidSelector {
        /// The offending selector.
        selector: String,
        /// Parser message.
        reason: String,
    },

    /// The fetch itself failed.
    #[error("fetch failed: {0}")]
    Transport(#[from] TransportError),

    /// The server answered with a non-success status.
    #[error("HTTP error! Status: {0}")]
    Status(u16),

    /// The response was not an HTML document.
    #[error("expected HTML but received {0:?}")]
    NotHtml(Option<String>),
}

/// A required hook or data attribute is missing from the rendered markup.
///
/// These are logged and shown as a generic message; no request is sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientConfigError {
    /// The signup form has no email input.
    #[error("form {form:?} has no email input")]
    MissingEmailInput {
        /// Form id.
        form: String,
    },

    /// The signup form carries no anti-forgery token field.
    #[error("form {form:?} has no token field")]
    MissingToken {
        /// Form id.
        form: String,
    },

    /// The form wrapper does not name its register action.
    #[error("form {form:?} has no register action")]
    MissingRegisterAction {
        /// Form id.
        form: String,
    },

    /// The form wrapper does not name its profile modal.
    #[error("form {form:?} has no modal target")]
    MissingModalTarget {
        /// Form id.
        form: String,
    },

    /// The modal named by a form wrapper is not on the page.
    #[error("target modal {selector:?} not found")]
    ModalNotFound {
        /// The modal target selector.
        selector: String,
    },

    /// The modal has no hidden account identifier field.
    #[error("modal {modal:?} has no account identifier field")]
    MissingUserIdField {
        /// Modal id.
        modal: String,
    },

    /// Registration succeeded but the response carried no account identifier.
    #[error("registration response carried no account identifier")]
    MissingAccountId,

    /// The modal does not name its update action.
    #[error("modal {modal:?} has no update action")]
    MissingUpdateAction {
        /// Modal id.
        modal: String,
    },

    /// The modal does not name its originating form.
    #[error("modal {modal:?} has no target form id")]
    MissingTargetFormId {
        /// Modal id.
        modal: String,
    },

    /// The modal does not name its token action.
    #[error("modal {modal:?} has no token action")]
    MissingTokenAction {
        /// Modal id.
        modal: String,
    },

    /// The form the modal belongs to is not on the page.
    #[error("original form {form:?} for modal {modal:?} not found")]
    OriginalFormNotFound {
        /// Modal id.
        modal: String,
        /// Form id the modal names.
        form: String,
    },

    /// The originating form has no token for the modal's token action.
    #[error("token field for action {action:?} not found in form {form:?}")]
    TokenNotFound {
        /// Form id.
        form: String,
        /// Token action the modal declares.
        action: String,
    },
}

impl ClientConfigError {
    /// Generic message shown to the user for this error.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::ModalNotFound { .. } => "Client-side setup error (modal missing).",
            Self::MissingUserIdField { .. } | Self::MissingAccountId => {
                "Account created, but profile step failed. Please contact support."
            }
            Self::TokenNotFound { .. } => "Security token missing.",
            _ => "Client-side configuration error.",
        }
    }
}

/// Category of a server-reported failure, derived from the response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionKind {
    /// Bad email, bad identifier, or other invalid input.
    Validation,
    /// The anti-forgery token did not match its action.
    InvalidToken,
    /// The email is already registered.
    Conflict,
    /// The account does not exist.
    NotFound,
    /// Anything else the server reported.
    Server,
}

impl RejectionKind {
    /// Classify by HTTP status.
    #[must_use]
    pub const fn from_status(status: u16) -> Self {
        match status {
            400 | 422 => Self::Validation,
            401 | 403 => Self::InvalidToken,
            404 => Self::NotFound,
            409 => Self::Conflict,
            _ => Self::Server,
        }
    }
}

/// Errors returned by the signup controller.
///
/// By the time one is returned the relevant message region already shows it.
#[derive(Debug, Error)]
pub enum SignupError {
    /// Required markup is missing.
    #[error("client configuration error: {0}")]
    ClientConfig(#[from] ClientConfigError),

    /// The server answered `success: false`.
    #[error("server rejected the request ({kind:?}): {message}")]
    Rejected {
        /// Failure category.
        kind: RejectionKind,
        /// Message shown to the user.
        message: String,
    },

    /// The request failed or the response was not the JSON envelope.
    #[error("network error: {0}")]
    Network(String),

    /// No signup form with this id was discovered.
    #[error("unknown signup form: {0}")]
    UnknownForm(String),

    /// No profile modal with this id was discovered.
    #[error("unknown modal: {0}")]
    UnknownModal(String),

    /// The modal has no close control of this kind.
    #[error("modal {modal} has no {how:?} control")]
    NoDismissControl {
        /// Modal id.
        modal: String,
        /// Requested dismissal.
        how: Dismissal,
    },
}

/// Errors discovering signup markup in a document.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// A signup wrapper contains no form, or the form has no id.
    #[error("signup form #{index} has no form element with an id")]
    FormWithoutId {
        /// Position of the wrapper in the document.
        index: usize,
    },

    /// A profile modal has no id.
    #[error("profile modal #{index} has no id")]
    ModalWithoutId {
        /// Position of the modal in the document.
        index: usize,
    },

    /// A selector built from the markup contract does not parse.
    #[error("invalid selector {selector:?}: {reason}")]
    InvalidSelector {
        /// Selector text.
        selector: String,
        /// Parser message.
        reason: String,
    },
}
