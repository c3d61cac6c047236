use std::collections::HashMap;

use scraper::Html;
use url::Url;

use marquee_core::NavConfig;

use super::viewport::{HistoryEntry, LoadingPhase, Viewport};
use crate::markup::{self, parse_selector};

#[derive(Debug, Clone)]
struct Slot {
    url: Url,
    state: Option<HistoryEntry>,
}

/// In-memory [`Viewport`] built from a rendered document.
///
/// Only the elements named by the navigation config are tracked. Every
/// effect the controller has on the page is recorded so it can be asserted
/// on.
#[derive(Debug, Clone)]
pub struct HeadlessViewport {
    title: String,
    elements: HashMap<String, String>,
    behind: Vec<Slot>,
    current: Slot,
    ahead: Vec<Slot>,
    scroll_resets: Vec<Option<String>>,
    loading: Vec<LoadingPhase>,
    navigations: Vec<Url>,
    reloads: usize,
}

impl HeadlessViewport {
    /// Parse `html` as the page currently shown at `url`.
    ///
    /// Selectors in `config` that do not parse, or match nothing, leave the
    /// corresponding element absent.
    #[must_use]
    pub fn from_document(url: Url, html: &str, config: &NavConfig) -> Self {
        let document = Html::parse_document(html);
        let mut elements = HashMap::new();

        let selectors = std::iter::once(config.content_selector.as_str())
            .chain(config.main_scroll_selector.as_deref())
            .chain(config.loading_bar_selector.as_deref());
        for css in selectors {
            let Ok(selector) = parse_selector(css) else {
                tracing::warn!(selector = css, "ignoring unparsable selector");
                continue;
            };
            if let Some(element) = document.select(&selector).next() {
                elements.insert(css.to_owned(), element.inner_html());
            }
        }

        Self {
            title: markup::document_title(&document).unwrap_or_default(),
            elements,
            behind: Vec::new(),
            current: Slot { url, state: None },
            ahead: Vec::new(),
            scroll_resets: Vec::new(),
            loading: Vec::new(),
            navigations: Vec::new(),
            reloads: 0,
        }
    }

    /// Add or replace a tracked element.
    #[must_use]
    pub fn with_element(mut self, selector: impl Into<String>, html: impl Into<String>) -> Self {
        self.elements.insert(selector.into(), html.into());
        self
    }

    /// Remove a tracked element, as if a script had detached it.
    pub fn remove_element(&mut self, selector: &str) {
        self.elements.remove(selector);
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Number of history entries.
    #[must_use]
    pub fn history_len(&self) -> usize {
        self.behind.len() + 1 + self.ahead.len()
    }

    /// State stored on the current history entry.
    #[must_use]
    pub fn current_state(&self) -> Option<&HistoryEntry> {
        self.current.state.as_ref()
    }

    /// Move back one entry and return the state a pop event would carry.
    ///
    /// Returns `None` at the first entry (without moving) and for entries
    /// that carry no state.
    pub fn back(&mut self) -> Option<HistoryEntry> {
        let previous = self.behind.pop()?;
        let current = std::mem::replace(&mut self.current, previous);
        self.ahead.push(current);
        self.current_state().cloned()
    }

    /// Move forward one entry and return the state a pop event would carry.
    pub fn forward(&mut self) -> Option<HistoryEntry> {
        let next = self.ahead.pop()?;
        let current = std::mem::replace(&mut self.current, next);
        self.behind.push(current);
        self.current_state().cloned()
    }

    /// Scroll targets reset so far; `None` is the window.
    #[must_use]
    pub fn scroll_resets(&self) -> &[Option<String>] {
        &self.scroll_resets
    }

    #[must_use]
    pub fn loading_phases(&self) -> &[LoadingPhase] {
        &self.loading
    }

    /// URLs the page navigated to natively.
    #[must_use]
    pub fn navigations(&self) -> &[Url] {
        &self.navigations
    }

    #[must_use]
    pub const fn reloads(&self) -> usize {
        self.reloads
    }
}

impl Viewport for HeadlessViewport {
    fn location(&self) -> Url {
        self.current.url.clone()
    }

    fn content(&self, selector: &str) -> Option<String> {
        self.elements.get(selector).cloned()
    }

    fn replace_content(&mut self, selector: &str, html: &str) {
        if let Some(element) = self.elements.get_mut(selector) {
            html.clone_into(element);
        }
    }

    fn set_title(&mut self, title: &str) {
        title.clone_into(&mut self.title);
    }

    fn push_history(&mut self, entry: HistoryEntry) {
        self.ahead.clear();
        let next = Slot {
            url: entry.url.clone(),
            state: Some(entry),
        };
        let current = std::mem::replace(&mut self.current, next);
        self.behind.push(current);
    }

    fn replace_history(&mut self, entry: HistoryEntry) {
        self.current = Slot {
            url: entry.url.clone(),
            state: Some(entry),
        };
    }

    fn reset_scroll(&mut self, selector: Option<&str>) {
        let target = selector
            .filter(|s| self.elements.contains_key(*s))
            .map(String::from);
        self.scroll_resets.push(target);
    }

    fn set_loading(&mut self, selector: Option<&str>, phase: LoadingPhase) {
        if selector.is_some_and(|s| self.elements.contains_key(s)) {
            self.loading.push(phase);
        }
    }

    fn navigate(&mut self, url: &Url) {
        self.navigations.push(url.clone());
    }

    fn reload(&mut self) {
        self.reloads += 1;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><head><title>Home</title></head><body>
        <div id="loadingBar"></div>
        <main id="main"><div id="content"><p>home</p></div></main>
        </body></html>"#;

    fn viewport() -> HeadlessViewport {
        HeadlessViewport::from_document(
            Url::parse("https://marquee.test/").unwrap(),
            PAGE,
            &NavConfig::default(),
        )
    }

    fn url(path: &str) -> Url {
        Url::parse("https://marquee.test/").unwrap().join(path).unwrap()
    }

    #[test]
    fn test_from_document_tracks_configured_elements() {
        let viewport = viewport();
        assert_eq!(viewport.title(), "Home");
        assert_eq!(viewport.content("#content").as_deref(), Some("<p>home</p>"));
        assert!(viewport.content("#main").is_some());
        assert!(viewport.content("#loadingBar").is_some());
        assert!(viewport.content("#sidebar").is_none());
    }

    #[test]
    fn test_push_truncates_forward_entries() {
        let mut viewport = viewport();
        viewport.push_history(HistoryEntry::new(url("/a")));
        viewport.push_history(HistoryEntry::new(url("/b")));
        assert_eq!(viewport.back().unwrap().url, url("/a"));

        viewport.push_history(HistoryEntry::new(url("/c")));
        assert_eq!(viewport.history_len(), 3);
        assert!(viewport.forward().is_none());
        assert_eq!(viewport.location(), url("/c"));
    }

    #[test]
    fn test_back_to_initial_entry_has_no_state_until_replaced() {
        let mut viewport = viewport();
        viewport.push_history(HistoryEntry::new(url("/a")));
        assert!(viewport.back().is_none());
        assert_eq!(viewport.location(), url("/"));
        assert!(viewport.back().is_none());
    }

    #[test]
    fn test_scroll_falls_back_to_window() {
        let mut viewport = viewport();
        viewport.reset_scroll(Some("#main"));
        viewport.reset_scroll(Some("#missing"));
        viewport.reset_scroll(None);
        assert_eq!(
            viewport.scroll_resets(),
            &[Some("#main".to_owned()), None, None]
        );
    }

    #[test]
    fn test_replace_content_on_missing_element_is_noop() {
        let mut viewport = viewport();
        viewport.replace_content("#missing", "<p>x</p>");
        assert!(viewport.content("#missing").is_none());
    }
}
