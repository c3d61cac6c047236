//! In-place page navigation.
//!
//! The controller intercepts link clicks and history pops, fetches the target
//! page, and swaps its content region into the live one. Anything it cannot
//! handle ends in a native navigation, so the page is never left half
//! updated.

mod cache;
mod decision;
mod events;
mod headless;
mod viewport;

use std::time::Duration;

use scraper::Selector;
use url::Url;

use marquee_core::NavConfig;

use crate::error::NavigationError;
use crate::markup::{Fragment, extract_fragment, parse_selector};
use crate::transport::Transport;

pub use cache::PageCache;
pub use decision::{Decision, Link, Modifiers, SkipReason, UrlPolicy};
pub use events::{ContentRegion, PageReady, PageReadyListeners};
pub use headless::HeadlessViewport;
pub use viewport::{HistoryEntry, LoadingPhase, Viewport};

/// A click as delivered to the controller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Click {
    /// The closest enclosing anchor, if the click landed inside one.
    pub link: Option<Link>,
    pub modifiers: Modifiers,
}

impl Click {
    /// A plain click on `link`.
    #[must_use]
    pub fn on(link: Link) -> Self {
        Self {
            link: Some(link),
            modifiers: Modifiers::default(),
        }
    }

    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// Whether a load pushes a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryMode {
    /// Link click: push the new URL.
    Push,
    /// History pop: the browser already moved.
    Keep,
}

/// Where the controller is in a navigation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavState {
    /// Started, nothing in flight.
    Idle,
    Deciding,
    Fetching,
    Rendering,
    /// The last load rendered.
    Ready,
    /// Not started, switched off, or the page has no content region.
    Disabled,
}

/// Why [`NavigationController::start`] left navigation to the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisabledReason {
    /// `enabled` is false.
    Config,
    /// The page has no element matching the content selector.
    MissingContentRegion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started {
        /// Whether the initial content was cached.
        cached: bool,
    },
    Disabled(DisabledReason),
}

/// Why a click was not intercepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeReason {
    Disabled,
    /// A modifier key was held.
    Modifier,
    /// The click was not inside an anchor.
    NotALink,
    Skipped(SkipReason),
}

#[derive(Debug)]
pub enum ClickOutcome {
    /// The browser follows the link.
    Native(NativeReason),
    /// The click was intercepted and loaded.
    Loaded(LoadOutcome),
}

#[derive(Debug)]
pub enum PopOutcome {
    /// Navigation is disabled.
    Ignored,
    /// The target must not be loaded in place; the page was reloaded.
    Reloaded(SkipReason),
    Loaded(LoadOutcome),
}

/// Why a load gave up and navigated natively.
#[derive(Debug)]
pub enum FallbackReason {
    /// The live page lost its content region.
    MissingContentRegion,
    /// The fetched document has no content region.
    MissingFragment,
    /// Fetch, status, or content-type failure.
    Failed(NavigationError),
}

#[derive(Debug)]
pub enum LoadOutcome {
    Rendered {
        /// Served from the cache without a request.
        from_cache: bool,
    },
    NativeFallback(FallbackReason),
}

impl LoadOutcome {
    #[must_use]
    pub const fn is_rendered(&self) -> bool {
        matches!(self, Self::Rendered { .. })
    }
}

/// Drives in-place navigation over a [`Viewport`] using a [`Transport`].
///
/// All methods take `&mut self`. Loads are awaited one at a time, so when two
/// navigations race, whichever completes last owns the content region.
pub struct NavigationController<V, T> {
    config: NavConfig,
    policy: UrlPolicy,
    content: Selector,
    viewport: V,
    transport: T,
    cache: PageCache,
    listeners: PageReadyListeners,
    state: NavState,
}

impl<V: Viewport, T: Transport> NavigationController<V, T> {
    /// Build a controller. Nothing happens until [`Self::start`].
    ///
    /// # Errors
    ///
    /// Returns `NavigationError::InvalidPattern` or
    /// `NavigationError::InvalidSelector` for a bad config.
    pub fn new(config: NavConfig, viewport: V, transport: T) -> Result<Self, NavigationError> {
        let policy = UrlPolicy::new(&config)?;
        let content = parse_selector(&config.content_selector).map_err(|reason| {
            NavigationError::InvalidSelector {
                selector: config.content_selector.clone(),
                reason,
            }
        })?;

        Ok(Self {
            config,
            policy,
            content,
            viewport,
            transport,
            cache: PageCache::new(),
            listeners: PageReadyListeners::default(),
            state: NavState::Disabled,
        })
    }

    /// Initialize against the current page.
    ///
    /// Caches the initial content when eligible and fires the first
    /// page-ready event.
    pub fn start(&mut self) -> StartOutcome {
        if !self.config.enabled {
            self.state = NavState::Disabled;
            return StartOutcome::Disabled(DisabledReason::Config);
        }

        let Some(html) = self.viewport.content(&self.config.content_selector) else {
            tracing::warn!(
                selector = %self.config.content_selector,
                "AJAX navigation disabled: content element not found"
            );
            self.state = NavState::Disabled;
            return StartOutcome::Disabled(DisabledReason::MissingContentRegion);
        };

        let location = self.viewport.location();
        let cached = self.policy.should_cache(&location) && !html.is_empty();
        if cached {
            self.cache.insert(&location, html.as_str());
            self.viewport.replace_history(HistoryEntry::new(location));
        }

        self.emit_ready(html);
        self.state = NavState::Idle;
        StartOutcome::Started { cached }
    }

    /// Handle a click anywhere on the page.
    pub async fn handle_click(&mut self, click: &Click) -> ClickOutcome {
        if self.state == NavState::Disabled {
            return ClickOutcome::Native(NativeReason::Disabled);
        }
        if click.modifiers.any() {
            return ClickOutcome::Native(NativeReason::Modifier);
        }
        let Some(link) = &click.link else {
            return ClickOutcome::Native(NativeReason::NotALink);
        };

        self.state = NavState::Deciding;
        let url = match self.policy.decide(&self.viewport.location(), link) {
            Decision::Ajax(url) => url,
            Decision::Skip(reason) => {
                tracing::debug!(?reason, href = ?link.href, "leaving link to the browser");
                self.state = NavState::Idle;
                return ClickOutcome::Native(NativeReason::Skipped(reason));
            }
        };

        if let Some(ms) = link.ajax_delay_ms.filter(|ms| *ms > 0) {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }

        ClickOutcome::Loaded(self.load(url, HistoryMode::Push).await)
    }

    /// Handle a back/forward navigation.
    ///
    /// `entry` is the state of the history entry popped to; without one the
    /// current location is the target.
    pub async fn handle_pop(&mut self, entry: Option<&HistoryEntry>) -> PopOutcome {
        if self.state == NavState::Disabled {
            return PopOutcome::Ignored;
        }

        let location = self.viewport.location();
        let target = entry.map_or_else(|| location.clone(), |entry| entry.url.clone());

        self.state = NavState::Deciding;
        match self.policy.decide(&location, &Link::new(target.as_str())) {
            Decision::Ajax(url) => PopOutcome::Loaded(self.load(url, HistoryMode::Keep).await),
            Decision::Skip(reason) => {
                tracing::debug!(?reason, url = %target, "popstate requires a full load");
                self.viewport.reload();
                self.state = NavState::Idle;
                PopOutcome::Reloaded(reason)
            }
        }
    }

    /// Load `url` into the content region.
    pub async fn load(&mut self, url: Url, history: HistoryMode) -> LoadOutcome {
        if self.viewport.content(&self.config.content_selector).is_none() {
            tracing::error!(
                selector = %self.config.content_selector,
                "AJAX navigation error: content element not found"
            );
            return self.fall_back(&url, FallbackReason::MissingContentRegion);
        }

        let cacheable = self.policy.should_cache(&url);
        if let Some(html) = self.cache.get(&url).filter(|_| cacheable).map(str::to_owned) {
            self.state = NavState::Rendering;
            self.viewport
                .replace_content(&self.config.content_selector, &html);
            self.finish(&url, history, html);
            return LoadOutcome::Rendered { from_cache: true };
        }

        self.state = NavState::Fetching;
        self.viewport
            .set_loading(self.config.loading_bar_selector.as_deref(), LoadingPhase::Started);

        let fragment = match self.fetch(&url).await {
            Ok(Some(fragment)) => fragment,
            Ok(None) => return self.fall_back(&url, FallbackReason::MissingFragment),
            Err(error) => {
                tracing::error!(%url, %error, "AJAX load error");
                return self.fall_back(&url, FallbackReason::Failed(error));
            }
        };

        self.state = NavState::Rendering;
        self.viewport
            .replace_content(&self.config.content_selector, &fragment.inner_html);
        if let Some(title) = &fragment.title {
            self.viewport.set_title(title);
        }
        if cacheable {
            self.cache.insert(&url, fragment.inner_html.as_str());
        }
        self.viewport
            .set_loading(self.config.loading_bar_selector.as_deref(), LoadingPhase::Finished);
        self.finish(&url, history, fragment.inner_html);

        LoadOutcome::Rendered { from_cache: false }
    }

    async fn fetch(&self, url: &Url) -> Result<Option<Fragment>, NavigationError> {
        let page = self.transport.get(url).await?;
        if !page.is_success() {
            return Err(NavigationError::Status(page.status));
        }
        if !page.is_html() {
            return Err(NavigationError::NotHtml(page.content_type));
        }
        Ok(extract_fragment(&page.body, &self.content))
    }

    fn finish(&mut self, url: &Url, history: HistoryMode, html: String) {
        if history == HistoryMode::Push {
            self.viewport.push_history(HistoryEntry::new(url.clone()));
        }
        self.viewport
            .reset_scroll(self.config.main_scroll_selector.as_deref());
        self.emit_ready(html);
        self.state = NavState::Ready;
    }

    fn fall_back(&mut self, url: &Url, reason: FallbackReason) -> LoadOutcome {
        if self.state == NavState::Fetching {
            self.viewport
                .set_loading(self.config.loading_bar_selector.as_deref(), LoadingPhase::Failed);
        }
        self.viewport.navigate(url);
        self.state = NavState::Idle;
        LoadOutcome::NativeFallback(reason)
    }

    fn emit_ready(&mut self, html: String) {
        let event = PageReady::new(self.config.content_selector.as_str(), html);
        self.listeners.emit(&event);
    }

    /// Register a page-ready listener.
    pub fn subscribe(&mut self, listener: impl FnMut(&PageReady) + Send + 'static) {
        self.listeners.subscribe(listener);
    }

    /// Number of page-ready events fired so far.
    #[must_use]
    pub const fn ready_events(&self) -> usize {
        self.listeners.fired()
    }

    #[must_use]
    pub const fn state(&self) -> NavState {
        self.state
    }

    #[must_use]
    pub const fn config(&self) -> &NavConfig {
        &self.config
    }

    #[must_use]
    pub const fn cache(&self) -> &PageCache {
        &self.cache
    }

    #[must_use]
    pub const fn viewport(&self) -> &V {
        &self.viewport
    }

    pub const fn viewport_mut(&mut self) -> &mut V {
        &mut self.viewport
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use super::*;
    use crate::error::TransportError;
    use crate::transport::FetchedPage;

    const ORIGIN: &str = "https://marquee.test/";

    fn url(path: &str) -> Url {
        Url::parse(ORIGIN).unwrap().join(path).unwrap()
    }

    fn document(title: &str, content: &str) -> String {
        format!(
            r#"<!doctype html><html><head><title>{title}</title></head><body>
            <div id="loadingBar"></div>
            <main id="main"><div id="content">{content}</div></main>
            </body></html>"#
        )
    }

    #[derive(Default)]
    struct FakeSite {
        pages: Mutex<HashMap<String, FetchedPage>>,
        requests: Mutex<Vec<Url>>,
    }

    impl FakeSite {
        fn serve(&self, path: &str, page: FetchedPage) {
            self.pages
                .lock()
                .unwrap()
                .insert(url(path).to_string(), page);
        }

        fn requests(&self) -> Vec<Url> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for FakeSite {
        async fn get(&self, url: &Url) -> Result<FetchedPage, TransportError> {
            self.requests.lock().unwrap().push(url.clone());
            self.pages
                .lock()
                .unwrap()
                .get(url.as_str())
                .cloned()
                .ok_or_else(|| TransportError::Connection("connection refused".into()))
        }

        async fn post_form(
            &self,
            _url: &Url,
            _fields: &[(String, String)],
        ) -> Result<FetchedPage, TransportError> {
            Err(TransportError::Connection("not used".into()))
        }
    }

    fn controller(
        config: NavConfig,
    ) -> (
        NavigationController<HeadlessViewport, Arc<FakeSite>>,
        Arc<FakeSite>,
    ) {
        let site = Arc::new(FakeSite::default());
        site.serve("/about", FetchedPage::html(document("About", "<h1>About</h1>")));
        site.serve("/team", FetchedPage::html(document("Team", "<h1>Team</h1>")));
        let viewport = HeadlessViewport::from_document(
            url("/"),
            &document("Home", "<h1>Home</h1>"),
            &config,
        );
        let controller = NavigationController::new(config, viewport, Arc::clone(&site)).unwrap();
        (controller, site)
    }

    fn content<T: Transport>(controller: &NavigationController<HeadlessViewport, T>) -> String {
        controller.viewport().content("#content").unwrap()
    }

    #[test]
    fn test_start_caches_initial_page_and_fires_ready() {
        let (mut nav, _) = controller(NavConfig::default());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        nav.subscribe(move |event| sink.lock().unwrap().push(event.region.html.clone()));

        assert_eq!(nav.start(), StartOutcome::Started { cached: true });
        assert!(nav.cache().contains(&url("/")));
        assert_eq!(nav.viewport().current_state().unwrap().url, url("/"));
        assert_eq!(*seen.lock().unwrap(), vec!["<h1>Home</h1>".to_owned()]);
    }

    #[test]
    fn test_start_disabled_by_config() {
        let config = NavConfig {
            enabled: false,
            ..NavConfig::default()
        };
        let (mut nav, _) = controller(config);
        assert_eq!(nav.start(), StartOutcome::Disabled(DisabledReason::Config));
        assert_eq!(nav.ready_events(), 0);
    }

    #[tokio::test]
    async fn test_missing_content_region_disables_interception() {
        let (mut nav, site) = controller(NavConfig::default());
        nav.viewport_mut().remove_element("#content");

        assert_eq!(
            nav.start(),
            StartOutcome::Disabled(DisabledReason::MissingContentRegion)
        );
        let outcome = nav.handle_click(&Click::on(Link::new("/about"))).await;
        assert!(matches!(outcome, ClickOutcome::Native(NativeReason::Disabled)));
        assert!(site.requests().is_empty());
    }

    #[tokio::test]
    async fn test_click_fetches_and_swaps_content() {
        let (mut nav, site) = controller(NavConfig::default());
        nav.start();

        let outcome = nav.handle_click(&Click::on(Link::new("/about"))).await;

        assert!(matches!(
            outcome,
            ClickOutcome::Loaded(LoadOutcome::Rendered { from_cache: false })
        ));
        assert_eq!(site.requests(), vec![url("/about")]);
        assert_eq!(content(&nav), "<h1>About</h1>");
        let viewport = nav.viewport();
        assert_eq!(viewport.title(), "About");
        assert_eq!(viewport.location(), url("/about"));
        assert_eq!(viewport.history_len(), 2);
        assert_eq!(viewport.scroll_resets(), &[Some("#main".to_owned())]);
        assert_eq!(
            viewport.loading_phases(),
            &[LoadingPhase::Started, LoadingPhase::Finished]
        );
        assert!(nav.cache().contains(&url("/about")));
        assert_eq!(nav.ready_events(), 2);
        assert_eq!(nav.state(), NavState::Ready);
    }

    #[tokio::test]
    async fn test_repeat_visit_is_served_from_cache_with_identical_content() {
        let (mut nav, site) = controller(NavConfig::default());
        nav.start();

        nav.handle_click(&Click::on(Link::new("/about"))).await;
        let fetched = content(&nav);
        nav.handle_click(&Click::on(Link::new("/team"))).await;
        let outcome = nav.handle_click(&Click::on(Link::new("/about"))).await;

        assert!(matches!(
            outcome,
            ClickOutcome::Loaded(LoadOutcome::Rendered { from_cache: true })
        ));
        assert_eq!(content(&nav), fetched);
        assert_eq!(site.requests(), vec![url("/about"), url("/team")]);
        assert_eq!(nav.viewport().history_len(), 4);
    }

    #[tokio::test]
    async fn test_never_cache_params_skip_the_cache() {
        let config = NavConfig {
            cache_enabled: true,
            ignore_url_params: vec!["nocache".into()],
            ..NavConfig::default()
        };
        let (mut nav, site) = controller(config);
        site.serve("/page", FetchedPage::html(document("Page", "<p>page</p>")));
        site.serve(
            "/page?nocache=1",
            FetchedPage::html(document("Page", "<p>fresh</p>")),
        );
        nav.start();

        nav.handle_click(&Click::on(Link::new("/page?nocache=1"))).await;
        assert!(!nav.cache().contains(&url("/page?nocache=1")));

        nav.handle_click(&Click::on(Link::new("/page"))).await;
        assert!(nav.cache().contains(&url("/page")));
    }

    #[tokio::test]
    async fn test_ignored_and_exempt_links_never_fetch() {
        let (mut nav, site) = controller(NavConfig::default());
        nav.start();

        for link in [
            Link::new("/wp-admin/"),
            Link::new("/wp-login.php"),
            Link::new("/files/menu.pdf"),
            Link::new("/about").with_class("no-ajax"),
            Link::new("/about").inside("no-ajax"),
        ] {
            let outcome = nav.handle_click(&Click::on(link)).await;
            assert!(matches!(
                outcome,
                ClickOutcome::Native(NativeReason::Skipped(_))
            ));
        }

        assert!(site.requests().is_empty());
        assert!(nav.viewport().navigations().is_empty());
    }

    #[tokio::test]
    async fn test_modifier_click_is_not_intercepted() {
        let (mut nav, site) = controller(NavConfig::default());
        nav.start();

        let click = Click::on(Link::new("/about")).with_modifiers(Modifiers {
            ctrl: true,
            ..Modifiers::default()
        });
        let outcome = nav.handle_click(&click).await;

        assert!(matches!(outcome, ClickOutcome::Native(NativeReason::Modifier)));
        assert!(site.requests().is_empty());
    }

    #[tokio::test]
    async fn test_click_outside_link() {
        let (mut nav, _) = controller(NavConfig::default());
        nav.start();
        let outcome = nav.handle_click(&Click::default()).await;
        assert!(matches!(outcome, ClickOutcome::Native(NativeReason::NotALink)));
    }

    #[tokio::test]
    async fn test_error_status_falls_back_to_native_navigation() {
        let (mut nav, site) = controller(NavConfig::default());
        site.serve(
            "/broken",
            FetchedPage {
                status: 500,
                content_type: Some("text/html".into()),
                body: document("Error", "oops"),
            },
        );
        nav.start();

        let outcome = nav.handle_click(&Click::on(Link::new("/broken"))).await;

        assert!(matches!(
            outcome,
            ClickOutcome::Loaded(LoadOutcome::NativeFallback(FallbackReason::Failed(
                NavigationError::Status(500)
            )))
        ));
        assert_eq!(nav.viewport().navigations(), &[url("/broken")]);
        assert_eq!(content(&nav), "<h1>Home</h1>");
        assert_eq!(
            nav.viewport().loading_phases(),
            &[LoadingPhase::Started, LoadingPhase::Failed]
        );
    }

    #[tokio::test]
    async fn test_non_html_response_falls_back() {
        let (mut nav, site) = controller(NavConfig::default());
        site.serve("/feed", FetchedPage::json(200, "{}"));
        nav.start();

        let outcome = nav.handle_click(&Click::on(Link::new("/feed"))).await;

        assert!(matches!(
            outcome,
            ClickOutcome::Loaded(LoadOutcome::NativeFallback(FallbackReason::Failed(
                NavigationError::NotHtml(_)
            )))
        ));
        assert_eq!(nav.viewport().navigations(), &[url("/feed")]);
    }

    #[tokio::test]
    async fn test_network_error_falls_back() {
        let (mut nav, _) = controller(NavConfig::default());
        nav.start();

        let outcome = nav.handle_click(&Click::on(Link::new("/unreachable"))).await;

        assert!(matches!(
            outcome,
            ClickOutcome::Loaded(LoadOutcome::NativeFallback(FallbackReason::Failed(
                NavigationError::Transport(_)
            )))
        ));
        assert_eq!(nav.viewport().navigations(), &[url("/unreachable")]);
    }

    #[tokio::test]
    async fn test_response_without_content_region_falls_back() {
        let (mut nav, site) = controller(NavConfig::default());
        site.serve(
            "/landing",
            FetchedPage::html("<html><head><title>Landing</title></head><body><p>bare</p></body></html>"),
        );
        nav.start();

        let outcome = nav.handle_click(&Click::on(Link::new("/landing"))).await;

        assert!(matches!(
            outcome,
            ClickOutcome::Loaded(LoadOutcome::NativeFallback(
                FallbackReason::MissingFragment
            ))
        ));
        assert_eq!(nav.viewport().navigations(), &[url("/landing")]);
        assert_eq!(nav.viewport().title(), "Home");
        assert!(!nav.cache().contains(&url("/landing")));
    }

    #[tokio::test]
    async fn test_pop_rerenders_without_pushing() {
        let (mut nav, site) = controller(NavConfig::default());
        nav.start();
        nav.handle_click(&Click::on(Link::new("/about"))).await;
        nav.handle_click(&Click::on(Link::new("/team"))).await;

        let entry = nav.viewport_mut().back();
        assert_eq!(entry.as_ref().unwrap().url, url("/about"));
        let outcome = nav.handle_pop(entry.as_ref()).await;

        assert!(matches!(
            outcome,
            PopOutcome::Loaded(LoadOutcome::Rendered { from_cache: true })
        ));
        assert_eq!(content(&nav), "<h1>About</h1>");
        assert_eq!(nav.viewport().history_len(), 3);
        assert_eq!(site.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_pop_without_cache_fetches_again() {
        let config = NavConfig {
            cache_enabled: false,
            ..NavConfig::default()
        };
        let (mut nav, site) = controller(config);
        nav.start();
        nav.handle_click(&Click::on(Link::new("/about"))).await;
        nav.handle_click(&Click::on(Link::new("/team"))).await;

        let entry = nav.viewport_mut().back();
        let outcome = nav.handle_pop(entry.as_ref()).await;

        assert!(matches!(
            outcome,
            PopOutcome::Loaded(LoadOutcome::Rendered { from_cache: false })
        ));
        assert_eq!(site.requests(), vec![url("/about"), url("/team"), url("/about")]);
        assert_eq!(nav.viewport().history_len(), 3);
    }

    #[tokio::test]
    async fn test_pop_to_skipped_url_reloads() {
        let (mut nav, site) = controller(NavConfig::default());
        nav.start();

        let entry = HistoryEntry::new(url("/wp-admin/edit.php"));
        let outcome = nav.handle_pop(Some(&entry)).await;

        assert!(matches!(
            outcome,
            PopOutcome::Reloaded(SkipReason::IgnoredPattern(_))
        ));
        assert_eq!(nav.viewport().reloads(), 1);
        assert!(site.requests().is_empty());
    }

    #[tokio::test]
    async fn test_pop_without_state_targets_location() {
        let (mut nav, site) = controller(NavConfig::default());
        nav.start();

        let outcome = nav.handle_pop(None).await;

        assert!(matches!(
            outcome,
            PopOutcome::Loaded(LoadOutcome::Rendered { from_cache: true })
        ));
        assert!(site.requests().is_empty());
    }

    #[tokio::test]
    async fn test_delayed_link_still_loads() {
        let (mut nav, site) = controller(NavConfig::default());
        nav.start();

        let outcome = nav
            .handle_click(&Click::on(Link::new("/team").with_delay(5)))
            .await;

        assert!(matches!(outcome, ClickOutcome::Loaded(ref load) if load.is_rendered()));
        assert_eq!(site.requests(), vec![url("/team")]);
    }

    #[test]
    fn test_invalid_content_selector_is_rejected() {
        let config = NavConfig {
            content_selector: "#".into(),
            ..NavConfig::default()
        };
        let viewport = HeadlessViewport::from_document(url("/"), "", &config);
        let result = NavigationController::new(config, viewport, Arc::new(FakeSite::default()));
        assert!(matches!(
            result,
            Err(NavigationError::InvalidSelector { .. })
        ));
    }
}
