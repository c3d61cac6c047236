use marquee_core::PAGE_READY_EVENT;

/// The content region a page-ready event was fired on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentRegion {
    pub selector: String,
    pub html: String,
}

/// Fired on the content region after initial load and after every in-place
/// render, so page scripts can re-initialize.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageReady {
    /// Always [`PAGE_READY_EVENT`].
    pub name: &'static str,
    /// The event bubbles from the content region to the document.
    pub bubbles: bool,
    pub region: ContentRegion,
}

impl PageReady {
    #[must_use]
    pub fn new(selector: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            name: PAGE_READY_EVENT,
            bubbles: true,
            region: ContentRegion {
                selector: selector.into(),
                html: html.into(),
            },
        }
    }
}

type Listener = Box<dyn FnMut(&PageReady) + Send>;

/// Subscribers to [`PageReady`].
#[derive(Default)]
pub struct PageReadyListeners {
    listeners: Vec<Listener>,
    fired: usize,
}

impl PageReadyListeners {
    pub fn subscribe(&mut self, listener: impl FnMut(&PageReady) + Send + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn emit(&mut self, event: &PageReady) {
        self.fired += 1;
        for listener in &mut self.listeners {
            listener(event);
        }
    }

    /// How many events have been emitted.
    #[must_use]
    pub const fn fired(&self) -> usize {
        self.fired
    }
}

impl std::fmt::Debug for PageReadyListeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageReadyListeners")
            .field("listeners", &self.listeners.len())
            .field("fired", &self.fired)
            .finish()
    }
}
