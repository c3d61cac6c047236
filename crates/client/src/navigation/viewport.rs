use url::Url;

/// A history entry pushed by the controller.
///
/// Entries carry the URL they were pushed for; a pop whose entry is absent
/// (the initial page, or an entry from another script) falls back to the
/// current location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub url: Url,
}

impl HistoryEntry {
    #[must_use]
    pub const fn new(url: Url) -> Self {
        Self { url }
    }
}

/// Phase of the loading indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadingPhase {
    /// Shown and advancing.
    Started,
    /// Completed and fading out.
    Finished,
    /// Reset after a failure.
    Failed,
}

/// The page surface the navigation controller drives.
///
/// Selectors are the ones from the navigation config. Operations on an
/// absent element are no-ops unless stated otherwise.
pub trait Viewport: Send {
    /// URL currently shown in the address bar.
    fn location(&self) -> Url;

    /// Inner markup of the element matching `selector`, or `None` if the
    /// page has no such element.
    fn content(&self, selector: &str) -> Option<String>;

    /// Replace the inner markup of the element matching `selector`.
    fn replace_content(&mut self, selector: &str, html: &str);

    /// Set the document title.
    fn set_title(&mut self, title: &str);

    /// Push a new history entry and update the location.
    fn push_history(&mut self, entry: HistoryEntry);

    /// Replace the current history entry.
    fn replace_history(&mut self, entry: HistoryEntry);

    /// Scroll the element matching `selector` to the top, or the window when
    /// `selector` is `None` or matches nothing.
    fn reset_scroll(&mut self, selector: Option<&str>);

    /// Drive the loading indicator, if the page has one.
    fn set_loading(&mut self, selector: Option<&str>, phase: LoadingPhase);

    /// Leave the page: a full browser navigation to `url`.
    fn navigate(&mut self, url: &Url);

    /// Reload the current page.
    fn reload(&mut self);
}
