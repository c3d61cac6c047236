//! Whether a link is loaded in place or left to the browser, and whether its
//! content may be cached.

use regex::{Regex, RegexBuilder};
use url::Url;

use marquee_core::NavConfig;

use crate::error::NavigationError;

/// Keyboard modifiers held during a click.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub meta: bool,
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
}

impl Modifiers {
    /// Whether any modifier is held.
    #[must_use]
    pub const fn any(self) -> bool {
        self.meta || self.ctrl || self.shift || self.alt
    }
}

/// The anchor a click landed on, reduced to what the decision needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Link {
    /// Raw `href` attribute, possibly relative.
    pub href: Option<String>,
    /// `target` attribute.
    pub target: Option<String>,
    /// Whether the `download` attribute is present.
    pub download: bool,
    /// Classes on the anchor.
    pub classes: Vec<String>,
    /// Classes on every ancestor of the anchor.
    pub ancestor_classes: Vec<String>,
    /// Delay before loading, from `data-ajax-delay`.
    pub ajax_delay_ms: Option<u64>,
}

impl Link {
    /// A plain link to `href`.
    #[must_use]
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: Some(href.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    #[must_use]
    pub const fn with_download(mut self) -> Self {
        self.download = true;
        self
    }

    #[must_use]
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    /// Place the link inside an element carrying `class`.
    #[must_use]
    pub fn inside(mut self, class: impl Into<String>) -> Self {
        self.ancestor_classes.push(class.into());
        self
    }

    #[must_use]
    pub const fn with_delay(mut self, ms: u64) -> Self {
        self.ajax_delay_ms = Some(ms);
        self
    }

    fn carries(&self, class: &str) -> bool {
        self.classes
            .iter()
            .chain(&self.ancestor_classes)
            .any(|c| c == class)
    }

    /// Whether the link opens a new browsing context.
    fn opens_new_context(&self) -> bool {
        self.target.as_deref().is_some_and(|target| {
            let target = target.trim();
            target.eq_ignore_ascii_case("_blank") || !(target.is_empty() || target.starts_with('_'))
        })
    }
}

/// Why a link is left to the browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// No `href`.
    MissingHref,
    /// The `href` does not resolve to a URL.
    Unparsable,
    /// Not http or https.
    Scheme(String),
    /// Different origin from the current page.
    CrossOrigin,
    /// Opens a new tab or window.
    NewContext,
    /// Declares a forced download.
    Download,
    /// Path and query match an ignore pattern.
    IgnoredPattern(String),
    /// The link or an ancestor carries the exempt class.
    Exempt,
}

/// Outcome of [`UrlPolicy::decide`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Load the resolved URL in place.
    Ajax(Url),
    /// Let the browser navigate.
    Skip(SkipReason),
}

/// Compiled form of the URL-related options of a [`NavConfig`].
#[derive(Debug, Clone)]
pub struct UrlPolicy {
    patterns: Vec<Regex>,
    ignore_params: Vec<String>,
    cache_enabled: bool,
    no_ajax_class: String,
}

impl UrlPolicy {
    /// Compile the ignore patterns, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns `NavigationError::InvalidPattern` for the first pattern that
    /// is not a valid regex.
    pub fn new(config: &NavConfig) -> Result<Self, NavigationError> {
        let patterns = config
            .ignore_url_patterns
            .iter()
            .map(|pattern| {
                RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|source| NavigationError::InvalidPattern {
                        pattern: pattern.clone(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            patterns,
            ignore_params: config.ignore_url_params.clone(),
            cache_enabled: config.cache_enabled,
            no_ajax_class: config.no_ajax_class.clone(),
        })
    }

    /// Decide how a link relative to `location` is followed.
    #[must_use]
    pub fn decide(&self, location: &Url, link: &Link) -> Decision {
        let Some(href) = link.href.as_deref().filter(|h| !h.trim().is_empty()) else {
            return Decision::Skip(SkipReason::MissingHref);
        };
        let Ok(url) = location.join(href.trim()) else {
            return Decision::Skip(SkipReason::Unparsable);
        };

        if !matches!(url.scheme(), "http" | "https") {
            return Decision::Skip(SkipReason::Scheme(url.scheme().to_owned()));
        }
        if url.origin() != location.origin() {
            return Decision::Skip(SkipReason::CrossOrigin);
        }
        if link.opens_new_context() {
            return Decision::Skip(SkipReason::NewContext);
        }
        if link.download {
            return Decision::Skip(SkipReason::Download);
        }

        let path_and_query = path_and_query(&url);
        if let Some(pattern) = self.patterns.iter().find(|p| p.is_match(&path_and_query)) {
            return Decision::Skip(SkipReason::IgnoredPattern(pattern.as_str().to_owned()));
        }

        if !self.no_ajax_class.is_empty() && link.carries(&self.no_ajax_class) {
            return Decision::Skip(SkipReason::Exempt);
        }

        Decision::Ajax(url)
    }

    /// Whether content fetched from `url` may be cached.
    #[must_use]
    pub fn should_cache(&self, url: &Url) -> bool {
        self.cache_enabled
            && !url
                .query_pairs()
                .any(|(name, _)| self.ignore_params.iter().any(|p| *p == name))
    }
}

/// Path plus `?query`, as matched by the ignore patterns.
fn path_and_query(url: &Url) -> String {
    match url.query() {
        Some(query) if !query.is_empty() => format!("{}?{query}", url.path()),
        _ => url.path().to_owned(),
    }
}
