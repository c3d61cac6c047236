//! HTML parsing helpers shared by the controllers.
//!
//! Parsed documents are never held across an `.await`; every helper takes a
//! string and returns owned data.

use scraper::{ElementRef, Html, Selector};

use marquee_core::NavConfig;
use marquee_core::nav::NAV_CONFIG_ELEMENT_ID;

use crate::navigation::Link;

/// The part of a fetched document the navigation controller swaps in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    /// Inner markup of the content region.
    pub inner_html: String,
    /// Text of the document's `<title>`, if it has one.
    pub title: Option<String>,
}

/// Parse a CSS selector, keeping the parser's message.
///
/// # Errors
///
/// Returns the parser's message if `css` is not a valid selector.
pub fn parse_selector(css: &str) -> Result<Selector, String> {
    Selector::parse(css).map_err(|e| e.to_string())
}

/// Locate the content region and title in a full document.
///
/// Returns `None` when the document has no element matching `content`.
#[must_use]
pub fn extract_fragment(document: &str, content: &Selector) -> Option<Fragment> {
    let html = Html::parse_document(document);
    let region = html.select(content).next()?;

    Some(Fragment {
        inner_html: region.inner_html(),
        title: document_title(&html),
    })
}

/// Text of the document's `<title>`.
pub(crate) fn document_title(html: &Html) -> Option<String> {
    let selector = Selector::parse("title").ok()?;
    html.select(&selector)
        .next()
        .map(|title| title.text().collect::<String>())
}

/// Navigation options the server embedded in `document`.
///
/// Reads the JSON block with id `nav-config`. Returns `None` when the block is
/// absent or does not parse; callers then use the defaults.
#[must_use]
pub fn nav_config(document: &str) -> Option<NavConfig> {
    let selector = Selector::parse(&format!("script#{NAV_CONFIG_ELEMENT_ID}")).ok()?;
    let html = Html::parse_document(document);
    let json = html.select(&selector).next()?.text().collect::<String>();
    serde_json::from_str(&json)
        .inspect_err(|error| tracing::warn!(%error, "ignoring malformed navigation config"))
        .ok()
}

/// Build a [`Link`] from the first element matching `css` in a document.
///
/// The element may be the anchor itself or anything inside it; the nearest
/// enclosing `<a>` is used, as a click on a child would.
#[must_use]
pub fn link_at(document: &str, css: &str) -> Option<Link> {
    let selector = Selector::parse(css).ok()?;
    let html = Html::parse_document(document);
    let element = html.select(&selector).next()?;
    closest_anchor(element).map(link_from_element)
}

fn closest_anchor(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    if element.value().name() == "a" {
        return Some(element);
    }
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|ancestor| ancestor.value().name() == "a")
}

fn link_from_element(anchor: ElementRef<'_>) -> Link {
    let value = anchor.value();
    let classes = value.classes().map(String::from).collect();
    let ancestor_classes = anchor
        .ancestors()
        .filter_map(ElementRef::wrap)
        .flat_map(|ancestor| {
            ancestor
                .value()
                .classes()
                .map(String::from)
                .collect::<Vec<_>>()
        })
        .collect();

    Link {
        href: value.attr("href").map(String::from),
        target: value.attr("target").map(String::from),
        download: value.attr("download").is_some(),
        classes,
        ancestor_classes,
        ajax_delay_ms: value
            .attr(marquee_core::markers::AJAX_DELAY)
            .and_then(|v| v.trim().parse().ok()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const DOC: &str = r##"<!doctype html>
        <html><head><title>Services | Marquee</title></head>
        <body>
          <main id="main">
            <div id="content"><h1>Services</h1><p>Web development</p></div>
          </main>
          <nav class="site-nav no-ajax">
            <a href="/legacy" id="legacy"><span class="label">Legacy</span></a>
          </nav>
          <a href="/slow" data-ajax-delay="150" target="_blank" download id="slow">Slow</a>
        </body></html>"##;

    #[test]
    fn test_extract_fragment_returns_inner_markup_and_title() {
        let selector = parse_selector("#content").unwrap();
        let fragment = extract_fragment(DOC, &selector).unwrap();
        assert_eq!(fragment.inner_html, "<h1>Services</h1><p>Web development</p>");
        assert_eq!(fragment.title.as_deref(), Some("Services | Marquee"));
    }

    #[test]
    fn test_extract_fragment_missing_region() {
        let selector = parse_selector("#nope").unwrap();
        assert!(extract_fragment(DOC, &selector).is_none());
    }

    #[test]
    fn test_parse_selector_rejects_garbage() {
        assert!(parse_selector("#").is_err());
    }

    #[test]
    fn test_link_at_walks_up_to_anchor_and_collects_ancestor_classes() {
        let link = link_at(DOC, "#legacy .label").unwrap();
        assert_eq!(link.href.as_deref(), Some("/legacy"));
        assert!(link.ancestor_classes.iter().any(|c| c == "no-ajax"));
        assert!(link.classes.is_empty());
    }

    #[test]
    fn test_link_at_reads_target_download_and_delay() {
        let link = link_at(DOC, "#slow").unwrap();
        assert_eq!(link.target.as_deref(), Some("_blank"));
        assert!(link.download);
        assert_eq!(link.ajax_delay_ms, Some(150));
    }

    #[test]
    fn test_link_at_outside_anchor() {
        assert!(link_at(DOC, "#main").is_none());
    }

    #[test]
    fn test_nav_config_reads_embedded_json() {
        let doc = r##"<html><head><script type="application/json" id="nav-config">
            {"enabled":false,"contentSelector":"#page","ignoreUrlParams":["s"],"x":"<\/script>"}
        </script></head><body></body></html>"##;
        let config = nav_config(doc).unwrap();
        assert!(!config.enabled);
        assert_eq!(config.content_selector, "#page");
        assert_eq!(config.no_ajax_class, NavConfig::default().no_ajax_class);
    }

    #[test]
    fn test_nav_config_absent_or_malformed() {
        assert!(nav_config(DOC).is_none());
        let doc = r#"<script type="application/json" id="nav-config">{not json</script>"#;
        assert!(nav_config(doc).is_none());
    }
}
