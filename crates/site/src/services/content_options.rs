//! Editable site copy stored as options.
//!
//! Templates ask for a key with a default; the stored value wins when it is
//! present and non-empty. Lookups are cached for a minute (`moka`).

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;

use crate::db::OptionsRepository;

/// Prefix of every content option key.
pub const OPTION_PREFIX: &str = "content_";

const CACHE_TTL: Duration = Duration::from_secs(60);
const CACHE_CAPACITY: u64 = 1_000;

/// Cached access to content options.
#[derive(Clone)]
pub struct ContentOptions {
    options: Arc<dyn OptionsRepository>,
    cache: Cache<String, Option<String>>,
}

impl ContentOptions {
    #[must_use]
    pub fn new(options: Arc<dyn OptionsRepository>) -> Self {
        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(CACHE_TTL)
            .build();
        Self { options, cache }
    }

    /// HTML-escaped value of `key`, or the escaped default.
    pub async fn text(&self, key: &str, default: &str) -> String {
        escape_html(&self.raw(key, default).await)
    }

    /// Unescaped value of `key`, or the default.
    ///
    /// A store failure is logged and treated as a missing value.
    pub async fn raw(&self, key: &str, default: &str) -> String {
        let name = format!("{OPTION_PREFIX}{key}");
        let options = Arc::clone(&self.options);
        let lookup = name.clone();
        let value = self
            .cache
            .get_with(name, async move {
                options.get(&lookup).await.unwrap_or_else(|e| {
                    tracing::warn!(key = %lookup, error = %e, "Content option lookup failed");
                    None
                })
            })
            .await;

        value
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| default.to_owned())
    }

    /// Store a value and drop its cached copy.
    ///
    /// # Errors
    ///
    /// Returns the store error if the write fails.
    pub async fn set(&self, key: &str, value: &str) -> Result<(), crate::db::RepositoryError> {
        let name = format!("{OPTION_PREFIX}{key}");
        self.options.set(&name, value).await?;
        self.cache.invalidate(&name).await;
        Ok(())
    }
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::MemoryOptionsRepository;

    #[tokio::test]
    async fn test_default_when_missing_or_empty() {
        let store = Arc::new(MemoryOptionsRepository::new());
        store.set("content_tagline", "   ").await.unwrap();
        let content = ContentOptions::new(store);

        assert_eq!(content.raw("headline", "Hello").await, "Hello");
        assert_eq!(content.raw("tagline", "Fallback").await, "Fallback");
    }

    #[tokio::test]
    async fn test_text_escapes_and_raw_does_not() {
        let content = ContentOptions::new(Arc::new(MemoryOptionsRepository::new()));
        content.set("headline", "<em>Bold & new</em>").await.unwrap();

        assert_eq!(
            content.text("headline", "").await,
            "&lt;em&gt;Bold &amp; new&lt;/em&gt;"
        );
        assert_eq!(content.raw("headline", "").await, "<em>Bold & new</em>");
    }

    #[tokio::test]
    async fn test_set_invalidates_cache() {
        let content = ContentOptions::new(Arc::new(MemoryOptionsRepository::new()));
        assert_eq!(content.raw("headline", "Default").await, "Default");

        content.set("headline", "Updated").await.unwrap();
        assert_eq!(content.raw("headline", "Default").await, "Updated");
    }
}
