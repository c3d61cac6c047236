use std::collections::HashMap;

use url::Url;

/// Content fragments keyed by absolute URL.
///
/// Entries live until the controller is dropped; there is no eviction and no
/// revalidation, so a cached page is served stale until the next full reload.
#[derive(Debug, Default)]
pub struct PageCache {
    entries: HashMap<String, String>,
}

impl PageCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, url: &Url) -> Option<&str> {
        self.entries.get(url.as_str()).map(String::as_str)
    }

    /// Store `html` for `url`, replacing any earlier entry.
    pub fn insert(&mut self, url: &Url, html: impl Into<String>) {
        self.entries.insert(url.as_str().to_owned(), html.into());
    }

    #[must_use]
    pub fn contains(&self, url: &Url) -> bool {
        self.entries.contains_key(url.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
