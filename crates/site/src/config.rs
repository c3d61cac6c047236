//! Site configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SITE_TOKEN_SECRET` - Anti-forgery token signing key (min 32 chars, high entropy)
//!
//! ## Optional
//! - `SITE_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`;
//!   in-memory stores when neither is set)
//! - `SITE_HOST` - Bind address (default: 127.0.0.1)
//! - `SITE_PORT` - Listen port (default: 3000)
//! - `SITE_BASE_URL` - Public URL of the site (default: `http://{host}:{port}`)
//! - `SITE_CONTENT_DIR` - Markdown page sources (default: `crates/site/content`)
//! - `SITE_TOKEN_LIFETIME_HOURS` - How long a rendered token stays valid (default: 24)
//! - `SITE_NAV_ENABLED` - Enable AJAX navigation (default: true)
//! - `SITE_NAV_CACHE_ENABLED` - Cache fetched pages client-side (default: true)
//! - `SITE_PAGE_REMOVAL` - `trash` or `permanent` for undefined managed pages (default: trash)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use marquee_core::NavConfig;

const MIN_TOKEN_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const DEFAULT_TOKEN_LIFETIME_HOURS: u64 = 24;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// What happens to a managed page that is no longer defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RemovalPolicy {
    /// Move to trash; recoverable.
    #[default]
    Trash,
    /// Delete the row.
    Permanent,
}

impl FromStr for RemovalPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trash" => Ok(Self::Trash),
            "permanent" => Ok(Self::Permanent),
            other => Err(format!("expected 'trash' or 'permanent', got '{other}'")),
        }
    }
}

/// Site application configuration.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct SiteConfig {
    /// `PostgreSQL` connection URL (contains password); memory stores when `None`
    pub database_url: Option<SecretString>,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL of the site
    pub base_url: String,
    /// Directory holding `pages/*.md`
    pub content_dir: PathBuf,
    /// Anti-forgery token signing key
    pub token_secret: SecretString,
    /// Token validity window in hours
    pub token_lifetime_hours: u64,
    /// Navigation options rendered into every page
    pub nav: NavConfig,
    /// Removal policy for managed pages
    pub page_removal: RemovalPolicy,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

impl std::fmt::Debug for SiteConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SiteConfig")
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "[REDACTED]"),
            )
            .field("host", &self.host)
            .field("port", &self.port)
            .field("base_url", &self.base_url)
            .field("content_dir", &self.content_dir)
            .field("token_secret", &"[REDACTED]")
            .field("token_lifetime_hours", &self.token_lifetime_hours)
            .field("nav", &self.nav)
            .field("page_removal", &self.page_removal)
            .field("sentry_dsn", &self.sentry_dsn)
            .field("sentry_environment", &self.sentry_environment)
            .finish()
    }
}

impl SiteConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the token secret fails validation (length, placeholder, entropy).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("SITE_DATABASE_URL");
        let host: IpAddr = parse_env("SITE_HOST", "127.0.0.1")?;
        let port: u16 = parse_env("SITE_PORT", "3000")?;
        let base_url = get_optional_env("SITE_BASE_URL")
            .unwrap_or_else(|| format!("http://{host}:{port}"));
        url::Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("SITE_BASE_URL".to_string(), e.to_string())
        })?;
        let content_dir = PathBuf::from(get_env_or_default(
            "SITE_CONTENT_DIR",
            "crates/site/content",
        ));

        let token_secret = get_validated_secret("SITE_TOKEN_SECRET")?;
        validate_secret_length(&token_secret, "SITE_TOKEN_SECRET")?;
        let token_lifetime_hours: u64 = parse_env(
            "SITE_TOKEN_LIFETIME_HOURS",
            &DEFAULT_TOKEN_LIFETIME_HOURS.to_string(),
        )?;
        if token_lifetime_hours < 2 {
            return Err(ConfigError::InvalidEnvVar(
                "SITE_TOKEN_LIFETIME_HOURS".to_string(),
                "must be at least 2".to_string(),
            ));
        }

        let nav = NavConfig {
            enabled: parse_env("SITE_NAV_ENABLED", "true")?,
            cache_enabled: parse_env("SITE_NAV_CACHE_ENABLED", "true")?,
            ..NavConfig::default()
        };
        let page_removal: RemovalPolicy = parse_env("SITE_PAGE_REMOVAL", "trash")?;

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            content_dir,
            token_secret,
            token_lifetime_hours,
            nav,
            page_removal,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Configuration for tests and local tooling: memory stores, default options.
    #[must_use]
    pub fn for_local(token_secret: SecretString, content_dir: impl Into<PathBuf>) -> Self {
        Self {
            database_url: None,
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            base_url: "http://127.0.0.1:3000".to_string(),
            content_dir: content_dir.into(),
            token_secret,
            token_lifetime_hours: DEFAULT_TOKEN_LIFETIME_HOURS,
            nav: NavConfig::default(),
            page_removal: RemovalPolicy::Trash,
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL` (used by Fly.io postgres attach).
fn get_database_url(primary_key: &str) -> Option<SecretString> {
    std::env::var(primary_key)
        .or_else(|_| std::env::var("DATABASE_URL"))
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(SecretString::from)
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Validate that a signing secret meets minimum length requirements.
fn validate_secret_length(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_TOKEN_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_TOKEN_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        // "ab" has entropy of 1 bit per char (50% a, 50% b)
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-token-key-here", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        let result = validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_validate_secret_length() {
        assert!(validate_secret_length(&SecretString::from("short"), "TEST").is_err());
        assert!(validate_secret_length(&SecretString::from("a".repeat(32)), "TEST").is_ok());
    }

    #[test]
    fn test_removal_policy_parse() {
        assert_eq!("trash".parse::<RemovalPolicy>().unwrap(), RemovalPolicy::Trash);
        assert_eq!(
            " Permanent ".parse::<RemovalPolicy>().unwrap(),
            RemovalPolicy::Permanent
        );
        assert!("delete".parse::<RemovalPolicy>().is_err());
        assert_eq!(RemovalPolicy::default(), RemovalPolicy::Trash);
    }

    #[test]
    fn test_socket_addr() {
        let config = SiteConfig::for_local(SecretString::from("k".repeat(32)), "content");
        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let mut config =
            SiteConfig::for_local(SecretString::from("qZ8#vT2!pL6@wN4$"), "content");
        config.database_url = Some(SecretString::from("postgres://u:hunter2@db/site"));

        let debug_output = format!("{config:?}");

        assert!(debug_output.contains("127.0.0.1"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("qZ8#vT2!pL6@wN4$"));
        assert!(!debug_output.contains("hunter2"));
    }
}
