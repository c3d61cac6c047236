//! Two-step email signup: register an email, then fill in the profile.
//!
//! Both steps verify the anti-forgery token against the token action before
//! touching storage, so a rejected request never mutates anything.

use std::sync::LazyLock;

use argon2::{
    Argon2,
    password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
};
use rand::seq::IndexedRandom;
use regex::Regex;
use tracing::instrument;

use marquee_core::{AccountId, Email, markers};

use super::tokens::TokenIssuer;
use crate::db::{Account, AccountRepository, RepositoryError};
use crate::error::ActionError;

/// Message returned after registration.
pub const REGISTERED_MESSAGE: &str = "Account created successfully!";
/// Message returned after a profile update.
pub const PROFILE_UPDATED_MESSAGE: &str = "Profile updated successfully!";

/// An HTML tag, or an unclosed one running to the end of the input.
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>?").expect("Invalid regex"));

const GENERATED_PASSWORD_LENGTH: usize = 24;
const PASSWORD_CHARSET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%^&*()-_[]{}<>~`+=,.;:/?|";

/// Names shared by the rendered signup markup and the action endpoint.
///
/// Built once at start-up and handed to the state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignupSettings {
    /// Action that registers an email.
    pub register_action: String,
    /// Action that updates the profile.
    pub update_action: String,
    /// Token action governing both steps.
    pub token_action: String,
    /// Id of the email form rendered on the home page.
    pub form_id: String,
}

impl Default for SignupSettings {
    fn default() -> Self {
        Self {
            register_action: "register_email".to_owned(),
            update_action: "update_user_details".to_owned(),
            token_action: "email_signup".to_owned(),
            form_id: "signup-form".to_owned(),
        }
    }
}

impl SignupSettings {
    /// Id of the profile modal paired with the form.
    #[must_use]
    pub fn modal_id(&self) -> String {
        markers::modal_id_for(&self.form_id)
    }
}

/// Signup operations over an account store.
pub struct SignupService<'a> {
    accounts: &'a dyn AccountRepository,
    tokens: &'a TokenIssuer,
    settings: &'a SignupSettings,
}

impl<'a> SignupService<'a> {
    #[must_use]
    pub const fn new(
        accounts: &'a dyn AccountRepository,
        tokens: &'a TokenIssuer,
        settings: &'a SignupSettings,
    ) -> Self {
        Self {
            accounts,
            tokens,
            settings,
        }
    }

    /// Create an account for `email` with a generated password.
    ///
    /// # Errors
    ///
    /// - `ActionError::InvalidToken` if the token does not match the token action
    /// - `ActionError::InvalidEmail` if the email is malformed
    /// - `ActionError::DuplicateAccount` if the email is already registered
    /// - `ActionError::CreateFailed` / `ActionError::PasswordHash` if creation fails
    #[instrument(skip(self, token))]
    pub async fn register(
        &self,
        email: Option<&str>,
        token: Option<&str>,
    ) -> Result<Account, ActionError> {
        self.check_token(token)?;

        let email = Email::parse(email.unwrap_or_default()).map_err(|e| {
            tracing::debug!(error = %e, "Rejected email");
            ActionError::InvalidEmail
        })?;

        if self.accounts.find_by_email(&email).await?.is_some() {
            return Err(ActionError::DuplicateAccount);
        }

        let password_hash = hash_password(&generate_password())?;

        let account = self
            .accounts
            .create(&email, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => ActionError::DuplicateAccount,
                other => ActionError::CreateFailed(other),
            })?;

        tracing::info!(account_id = %account.id, "Account registered");
        Ok(account)
    }

    /// Overwrite the first and last name of an existing account.
    ///
    /// Missing names are stored as empty strings. Repeating a request with
    /// the same values leaves the account unchanged.
    ///
    /// # Errors
    ///
    /// - `ActionError::InvalidToken` if the token does not match the token action
    /// - `ActionError::InvalidIdentifier` if `user_id` is not a positive integer
    /// - `ActionError::AccountNotFound` if no account has this id
    #[instrument(skip(self, first_name, last_name, token))]
    pub async fn update_profile(
        &self,
        user_id: Option<&str>,
        first_name: Option<&str>,
        last_name: Option<&str>,
        token: Option<&str>,
    ) -> Result<Account, ActionError> {
        self.check_token(token)?;

        let id = parse_account_id(user_id).ok_or(ActionError::InvalidIdentifier)?;
        if self.accounts.get(id).await?.is_none() {
            return Err(ActionError::AccountNotFound);
        }

        let first_name = sanitize_text(first_name.unwrap_or_default());
        let last_name = sanitize_text(last_name.unwrap_or_default());

        let account = self
            .accounts
            .update_names(id, &first_name, &last_name)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => ActionError::AccountNotFound,
                other => ActionError::Internal(other),
            })?;

        tracing::info!(account_id = %account.id, "Profile updated");
        Ok(account)
    }

    fn check_token(&self, token: Option<&str>) -> Result<(), ActionError> {
        self.tokens
            .verify(&self.settings.token_action, token)
            .map_err(|e| {
                tracing::warn!(error = %e, "Token check failed");
                ActionError::InvalidToken
            })
    }
}

/// Parse a positive account id.
fn parse_account_id(raw: Option<&str>) -> Option<AccountId> {
    raw.map(str::trim)
        .and_then(|s| s.parse::<i32>().ok())
        .filter(|id| *id > 0)
        .map(AccountId::new)
}

/// Plain single-line text: tags and control characters removed, whitespace
/// collapsed, trimmed.
fn sanitize_text(raw: &str) -> String {
    let stripped = TAG_RE.replace_all(raw, "");
    stripped
        .split(|c: char| c.is_whitespace())
        .map(|word| word.chars().filter(|c| !c.is_control()).collect::<String>())
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Random password for accounts created from an email alone.
fn generate_password() -> String {
    let mut rng = rand::rng();
    (0..GENERATED_PASSWORD_LENGTH)
        .filter_map(|_| PASSWORD_CHARSET.choose(&mut rng).copied().map(char::from))
        .collect()
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, ActionError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| ActionError::PasswordHash)
}
