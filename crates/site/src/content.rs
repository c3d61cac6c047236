//! Markdown page sources.
//!
//! Pages live in `content/pages/*.md` with YAML front matter:
//!
//! ```markdown
//! ---
//! title: About Us
//! template: page
//! description: Who we are
//! ---
//! Body in **markdown**.
//! ```
//!
//! The file stem is the slug. Every loaded page is also a managed-page
//! definition for reconciliation.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use comrak::{Options, markdown_to_html};
use gray_matter::{Matter, ParsedEntity, engine::YAML};
use serde::Deserialize;

/// Template used when the front matter names none.
pub const DEFAULT_TEMPLATE: &str = "page";

/// Front matter of a page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageMeta {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub template: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// A rendered page.
#[derive(Debug, Clone)]
pub struct Page {
    pub slug: String,
    pub title: String,
    pub template: String,
    pub description: String,
    pub content_html: String,
}

/// All pages, loaded once at start-up.
#[derive(Debug, Clone, Default)]
pub struct ContentStore {
    pages: Arc<BTreeMap<String, Page>>,
}

impl ContentStore {
    /// Load every page under `content_dir/pages`.
    ///
    /// A missing directory yields an empty store; a file that fails to parse
    /// is logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory exists but cannot be read.
    pub fn load(content_dir: &Path) -> Result<Self, ContentError> {
        let dir = content_dir.join("pages");
        if !dir.exists() {
            tracing::warn!("Pages directory does not exist: {:?}", dir);
            return Ok(Self::default());
        }

        let entries = std::fs::read_dir(&dir).map_err(|e| ContentError::Io(e.to_string()))?;

        let mut sources = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_none_or(|ext| ext != "md") {
                continue;
            }
            let Some(slug) = path.file_stem().and_then(|s| s.to_str()) else {
                tracing::error!("Invalid page filename: {:?}", path);
                continue;
            };
            match std::fs::read_to_string(&path) {
                Ok(source) => sources.push((slug.to_owned(), source)),
                Err(e) => tracing::error!("Failed to read page {:?}: {}", path, e),
            }
        }

        Ok(Self::from_sources(sources))
    }

    /// Build a store from `(slug, markdown)` pairs.
    pub fn from_sources<I, S, T>(sources: I) -> Self
    where
        I: IntoIterator<Item = (S, T)>,
        S: Into<String>,
        T: AsRef<str>,
    {
        let mut pages = BTreeMap::new();
        for (slug, source) in sources {
            let slug = slug.into();
            match parse_page(&slug, source.as_ref()) {
                Ok(page) => {
                    tracing::info!("Loaded page: {}", page.slug);
                    pages.insert(page.slug.clone(), page);
                }
                Err(e) => tracing::error!("Failed to load page {}: {}", slug, e),
            }
        }
        Self {
            pages: Arc::new(pages),
        }
    }

    /// Get a page by slug.
    #[must_use]
    pub fn get_page(&self, slug: &str) -> Option<&Page> {
        self.pages.get(slug)
    }

    /// All pages in slug order.
    pub fn pages(&self) -> impl Iterator<Item = &Page> {
        self.pages.values()
    }
}

fn parse_page(slug: &str, source: &str) -> Result<Page, ContentError> {
    if slug.is_empty() || !slug.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ContentError::Parse(format!("invalid slug '{slug}'")));
    }

    let matter = Matter::<YAML>::new();
    let parsed: ParsedEntity<PageMeta> = matter
        .parse(source)
        .map_err(|e| ContentError::Parse(format!("Failed to parse frontmatter: {e}")))?;
    let meta = parsed.data.unwrap_or_default();

    Ok(Page {
        slug: slug.to_owned(),
        title: meta
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| title_from_slug(slug)),
        template: meta
            .template
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TEMPLATE.to_owned()),
        description: meta.description.unwrap_or_default(),
        content_html: render_markdown(&parsed.content),
    })
}

/// `about-our_team` becomes `About Our Team`.
#[must_use]
pub fn title_from_slug(slug: &str) -> String {
    slug.split(['-', '_'])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect::<String>()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render markdown to HTML with GitHub Flavored Markdown support.
fn render_markdown(content: &str) -> String {
    let mut options = Options::default();

    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.header_ids = Some(String::new());

    // Allow raw HTML in markdown
    options.render.r#unsafe = true;

    markdown_to_html(content, &options)
}

/// Content loading errors
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_front_matter_and_markdown() {
        let store = ContentStore::from_sources([(
            "about",
            "---\ntitle: About Us\ndescription: Who we are\n---\nHello **world**\n",
        )]);
        let page = store.get_page("about").unwrap();
        assert_eq!(page.title, "About Us");
        assert_eq!(page.template, DEFAULT_TEMPLATE);
        assert_eq!(page.description, "Who we are");
        assert!(page.content_html.contains("<strong>world</strong>"));
    }

    #[test]
    fn test_defaults_without_front_matter() {
        let store = ContentStore::from_sources([("our-services", "Plain body")]);
        let page = store.get_page("our-services").unwrap();
        assert_eq!(page.title, "Our Services");
        assert_eq!(page.template, "page");
    }

    #[test]
    fn test_invalid_slug_is_skipped() {
        let store = ContentStore::from_sources([("../etc", "x"), ("ok", "y")]);
        assert!(store.get_page("../etc").is_none());
        assert_eq!(store.pages().count(), 1);
    }

    #[test]
    fn test_title_from_slug() {
        assert_eq!(title_from_slug("home"), "Home");
        assert_eq!(title_from_slug("about-our_team"), "About Our Team");
        assert_eq!(title_from_slug("--"), "");
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let store = ContentStore::load(Path::new("/nonexistent/marquee-content")).unwrap();
        assert_eq!(store.pages().count(), 0);
    }
}
