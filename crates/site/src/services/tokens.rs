//! Anti-forgery tokens.
//!
//! A token is the truncated hex HMAC-SHA256 of `{action}|{tick}`, where a
//! tick is half the configured lifetime. Tokens from the current and the
//! previous tick verify, so a rendered form stays usable for at least half
//! the lifetime and at most the whole of it.

use chrono::Utc;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Hex characters kept from the MAC.
const TOKEN_LENGTH: usize = 20;

/// Why a token was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token missing")]
    Missing,
    #[error("token invalid or expired")]
    Invalid,
}

/// Issues and verifies tokens bound to an action name.
#[derive(Clone)]
pub struct TokenIssuer {
    key: SecretString,
    tick_secs: u64,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("key", &"[REDACTED]")
            .field("tick_secs", &self.tick_secs)
            .finish()
    }
}

impl TokenIssuer {
    /// Create an issuer whose tokens live for `lifetime_hours`.
    #[must_use]
    pub fn new(key: SecretString, lifetime_hours: u64) -> Self {
        Self {
            key,
            tick_secs: (lifetime_hours.max(2) * 3600) / 2,
        }
    }

    /// Token for `action`, valid from now.
    #[must_use]
    pub fn issue(&self, action: &str) -> String {
        self.issue_at(action, now_secs())
    }

    /// Check `token` was issued for `action` and has not expired.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Missing` for an empty token and
    /// `TokenError::Invalid` for a wrong or expired one.
    pub fn verify(&self, action: &str, token: Option<&str>) -> Result<(), TokenError> {
        self.verify_at(action, token, now_secs())
    }

    fn tick(&self, at_secs: u64) -> u64 {
        at_secs / self.tick_secs
    }

    fn issue_at(&self, action: &str, at_secs: u64) -> String {
        self.sign(action, self.tick(at_secs)).unwrap_or_default()
    }

    fn verify_at(&self, action: &str, token: Option<&str>, at_secs: u64) -> Result<(), TokenError> {
        let token = token.map(str::trim).filter(|t| !t.is_empty());
        let Some(token) = token else {
            return Err(TokenError::Missing);
        };

        let tick = self.tick(at_secs);
        let valid = [Some(tick), tick.checked_sub(1)]
            .into_iter()
            .flatten()
            .filter_map(|t| self.sign(action, t))
            .any(|expected| constant_time_compare(&expected, token));

        if valid { Ok(()) } else { Err(TokenError::Invalid) }
    }

    fn sign(&self, action: &str, tick: u64) -> Option<String> {
        let mut mac = HmacSha256::new_from_slice(self.key.expose_secret().as_bytes()).ok()?;
        mac.update(format!("{action}|{tick}").as_bytes());

        let mut token = hex::encode(mac.finalize().into_bytes());
        token.truncate(TOKEN_LENGTH);
        Some(token)
    }
}

fn now_secs() -> u64 {
    u64::try_from(Utc::now().timestamp()).unwrap_or(0)
}

/// Compare two strings without short-circuiting on the first difference.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result: u8 = 0;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }

    result == 0
}
