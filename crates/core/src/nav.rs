//! Navigation configuration shared by the site and the navigation controller.
//!
//! The site serializes a [`NavConfig`] into every rendered layout; the client
//! reads it back before starting the controller. Field names are camelCase
//! on the wire and missing fields take their defaults.

use serde::{Deserialize, Serialize};

/// Name of the lifecycle event fired after every content swap.
pub const PAGE_READY_EVENT: &str = "themePageReady";

/// Id of the script element that carries the serialized [`NavConfig`].
pub const NAV_CONFIG_ELEMENT_ID: &str = "nav-config";

/// Recognized navigation options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NavConfig {
    /// Master switch. When off, no link is ever intercepted.
    pub enabled: bool,
    /// Selector of the region whose inner markup is swapped.
    pub content_selector: String,
    /// Selector of the element scrolled to the top after a swap; window when absent.
    pub main_scroll_selector: Option<String>,
    /// Selector of the optional progress element.
    pub loading_bar_selector: Option<String>,
    /// Whether fetched fragments are cached for the lifetime of the page.
    pub cache_enabled: bool,
    /// Case-insensitive regexes tested against path + query; a match forces native navigation.
    pub ignore_url_patterns: Vec<String>,
    /// Query parameter names whose presence disables caching for that URL.
    pub ignore_url_params: Vec<String>,
    /// Class that exempts a link, or any link inside an element carrying it.
    pub no_ajax_class: String,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            content_selector: "#content".to_owned(),
            main_scroll_selector: Some("#main".to_owned()),
            loading_bar_selector: Some("#loadingBar".to_owned()),
            cache_enabled: true,
            ignore_url_patterns: vec![
                "/wp-admin".to_owned(),
                r"/wp-login\.php".to_owned(),
                r"\.(pdf|zip|rar|jpg|jpeg|png|gif|webp|mp3|mp4|xml|txt|docx|xlsx)$".to_owned(),
            ],
            ignore_url_params: vec!["s".to_owned(), "nocache".to_owned(), "preview".to_owned()],
            no_ajax_class: "no-ajax".to_owned(),
        }
    }
}
