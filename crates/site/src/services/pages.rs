//! Managed-page reconciliation.
//!
//! Pages defined in code (the markdown sources) are reconciled against the
//! page store in three phases, run together in one call:
//!
//! 1. [`collect`] the desired definitions
//! 2. [`diff`] them against the persisted pages into a [`ReconcilePlan`]
//! 3. [`PageReconciler::apply`] the plan through the repositories
//!
//! Only pages flagged as managed are ever removed. A page that already
//! exists under a defined slug is adopted (flagged as managed) rather than
//! duplicated. Titles of existing pages are left alone so editors can change
//! them.

use std::collections::HashSet;

use thiserror::Error;
use tracing::instrument;

use marquee_core::{PageId, PageStatus};

use crate::config::RemovalPolicy;
use crate::content::{ContentStore, DEFAULT_TEMPLATE, title_from_slug};
use crate::db::{NewPage, OptionsRepository, PageRecord, PageRepository, RepositoryError};

/// Option holding the id of the front page; absent means the page index.
pub const FRONT_PAGE_OPTION: &str = "page_on_front";
/// Slug of the page that becomes the front page.
pub const HOME_SLUG: &str = "home";

/// Errors from applying a plan.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("failed to {op} page '{slug}': {source}")]
    Apply {
        op: &'static str,
        slug: String,
        #[source]
        source: RepositoryError,
    },

    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// A page the site wants to exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageDefinition {
    pub slug: String,
    pub title: String,
    pub template: String,
}

impl PageDefinition {
    /// Definition with the title derived from the slug and the default template.
    #[must_use]
    pub fn new(slug: impl Into<String>) -> Self {
        let slug = slug.into();
        Self {
            title: title_from_slug(&slug),
            template: DEFAULT_TEMPLATE.to_owned(),
            slug,
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }
}

/// Change to an existing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageUpdate {
    pub record: PageRecord,
    /// Template to set.
    pub template: String,
}

impl PageUpdate {
    /// The page was not managed before.
    #[must_use]
    pub const fn adopts(&self) -> bool {
        !self.record.managed
    }

    /// The page was trashed or drafted and gets published again.
    #[must_use]
    pub fn restores(&self) -> bool {
        self.record.status != PageStatus::Published
    }
}

/// What [`PageReconciler::apply`] will do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcilePlan {
    pub create: Vec<PageDefinition>,
    pub update: Vec<PageUpdate>,
    pub remove: Vec<PageRecord>,
    pub removal: RemovalPolicy,
    /// Whether a home page is defined.
    pub has_home: bool,
}

impl ReconcilePlan {
    /// Nothing to create, update or remove.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.create.is_empty() && self.update.is_empty() && self.remove.is_empty()
    }
}

/// Outcome of an applied plan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub created: Vec<String>,
    pub updated: Vec<String>,
    pub removed: Vec<String>,
    pub front_page: Option<PageId>,
}

/// Phase 1: the definitions implied by the loaded content.
#[must_use]
pub fn collect(content: &ContentStore) -> Vec<PageDefinition> {
    content
        .pages()
        .map(|page| {
            PageDefinition::new(page.slug.clone())
                .with_title(page.title.clone())
                .with_template(page.template.clone())
        })
        .collect()
}

/// Phase 2: compare definitions with persisted pages.
#[must_use]
pub fn diff(
    definitions: &[PageDefinition],
    existing: &[PageRecord],
    removal: RemovalPolicy,
) -> ReconcilePlan {
    let mut create = Vec::new();
    let mut update = Vec::new();

    for definition in definitions {
        match existing.iter().find(|page| page.slug == definition.slug) {
            None => create.push(definition.clone()),
            Some(record) => {
                let stale = record.template != definition.template
                    || !record.managed
                    || record.status != PageStatus::Published;
                if stale {
                    update.push(PageUpdate {
                        record: record.clone(),
                        template: definition.template.clone(),
                    });
                }
            }
        }
    }

    let defined: HashSet<&str> = definitions.iter().map(|d| d.slug.as_str()).collect();
    let remove = existing
        .iter()
        .filter(|page| page.managed && !defined.contains(page.slug.as_str()))
        .filter(|page| removal == RemovalPolicy::Permanent || page.status != PageStatus::Trashed)
        .cloned()
        .collect();

    ReconcilePlan {
        create,
        update,
        remove,
        removal,
        has_home: defined.contains(HOME_SLUG),
    }
}

/// Phase 3: applies plans through the page and option stores.
pub struct PageReconciler<'a> {
    pages: &'a dyn PageRepository,
    options: &'a dyn OptionsRepository,
    removal: RemovalPolicy,
}

impl<'a> PageReconciler<'a> {
    #[must_use]
    pub const fn new(
        pages: &'a dyn PageRepository,
        options: &'a dyn OptionsRepository,
        removal: RemovalPolicy,
    ) -> Self {
        Self {
            pages,
            options,
            removal,
        }
    }

    /// Diff `definitions` against the store without changing anything.
    ///
    /// # Errors
    ///
    /// Returns `ReconcileError::Repository` if the pages cannot be listed.
    pub async fn plan(&self, definitions: &[PageDefinition]) -> Result<ReconcilePlan, ReconcileError> {
        let existing = self.pages.list().await?;
        Ok(diff(definitions, &existing, self.removal))
    }

    /// Apply `plan` and point the front page at the home page.
    ///
    /// Stops at the first failure and returns it; changes already made stay.
    ///
    /// # Errors
    ///
    /// Returns `ReconcileError::Apply` naming the page that failed.
    #[instrument(skip_all, fields(
        create = plan.create.len(),
        update = plan.update.len(),
        remove = plan.remove.len(),
    ))]
    pub async fn apply(&self, plan: &ReconcilePlan) -> Result<ReconcileReport, ReconcileError> {
        let mut report = ReconcileReport::default();

        for definition in &plan.create {
            let new_page = NewPage {
                slug: definition.slug.clone(),
                title: definition.title.clone(),
                template: definition.template.clone(),
            };
            self.pages
                .insert(&new_page)
                .await
                .map_err(|source| apply_error("create", &definition.slug, source))?;
            tracing::info!(slug = %definition.slug, "Created managed page");
            report.created.push(definition.slug.clone());
        }

        for change in &plan.update {
            self.pages
                .update(change.record.id, &change.template, PageStatus::Published, true)
                .await
                .map_err(|source| apply_error("update", &change.record.slug, source))?;
            tracing::info!(
                slug = %change.record.slug,
                adopted = change.adopts(),
                restored = change.restores(),
                "Updated managed page"
            );
            report.updated.push(change.record.slug.clone());
        }

        for page in &plan.remove {
            let result = match plan.removal {
                RemovalPolicy::Trash => {
                    self.pages
                        .update(page.id, &page.template, PageStatus::Trashed, true)
                        .await
                }
                RemovalPolicy::Permanent => self.pages.delete(page.id).await,
            };
            result.map_err(|source| apply_error("remove", &page.slug, source))?;
            tracing::info!(slug = %page.slug, policy = ?plan.removal, "Removed managed page");
            report.removed.push(page.slug.clone());
        }

        report.front_page = self.update_front_page(plan.has_home).await?;
        Ok(report)
    }

    /// Plan and apply in one call.
    ///
    /// # Errors
    ///
    /// See [`Self::plan`] and [`Self::apply`].
    pub async fn reconcile(
        &self,
        definitions: &[PageDefinition],
    ) -> Result<ReconcileReport, ReconcileError> {
        let plan = self.plan(definitions).await?;
        self.apply(&plan).await
    }

    async fn update_front_page(&self, has_home: bool) -> Result<Option<PageId>, ReconcileError> {
        let home = if has_home {
            self.pages.find_by_slug(HOME_SLUG).await?
        } else {
            None
        };

        match home {
            Some(page) => {
                self.options
                    .set(FRONT_PAGE_OPTION, &page.id.to_string())
                    .await?;
                Ok(Some(page.id))
            }
            None => {
                self.options.delete(FRONT_PAGE_OPTION).await?;
                Ok(None)
            }
        }
    }
}

fn apply_error(op: &'static str, slug: &str, source: RepositoryError) -> ReconcileError {
    ReconcileError::Apply {
        op,
        slug: slug.to_owned(),
        source,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::db::{MemoryOptionsRepository, MemoryPageRepository};

    fn record(id: i32, slug: &str, template: &str, status: PageStatus, managed: bool) -> PageRecord {
        PageRecord {
            id: PageId::new(id),
            slug: slug.to_owned(),
            title: title_from_slug(slug),
            template: template.to_owned(),
            status,
            managed,
        }
    }

    #[test]
    fn test_diff_creates_missing_pages() {
        let defs = vec![PageDefinition::new("home").with_template("home")];
        let plan = diff(&defs, &[], RemovalPolicy::Trash);
        assert_eq!(plan.create, defs);
        assert!(plan.update.is_empty());
        assert!(plan.has_home);
    }

    #[test]
    fn test_diff_updates_template_adopts_and_restores() {
        let defs = vec![
            PageDefinition::new("about"),
            PageDefinition::new("contact"),
            PageDefinition::new("services"),
            PageDefinition::new("faq"),
        ];
        let existing = vec![
            record(1, "about", "landing", PageStatus::Published, true),
            record(2, "contact", "page", PageStatus::Published, false),
            record(3, "services", "page", PageStatus::Trashed, true),
            record(4, "faq", "page", PageStatus::Published, true),
        ];

        let plan = diff(&defs, &existing, RemovalPolicy::Trash);
        let slugs: Vec<_> = plan.update.iter().map(|u| u.record.slug.as_str()).collect();
        assert_eq!(slugs, vec!["about", "contact", "services"]);
        assert!(plan.update[1].adopts());
        assert!(plan.update[2].restores());
        assert!(plan.create.is_empty());
    }

    #[test]
    fn test_diff_removes_only_managed_undefined_pages() {
        let existing = vec![
            record(1, "old", "page", PageStatus::Published, true),
            record(2, "legacy", "page", PageStatus::Published, false),
            record(3, "gone", "page", PageStatus::Trashed, true),
        ];

        let plan = diff(&[], &existing, RemovalPolicy::Trash);
        let slugs: Vec<_> = plan.remove.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["old"]);

        let plan = diff(&[], &existing, RemovalPolicy::Permanent);
        let slugs: Vec<_> = plan.remove.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["old", "gone"]);
    }

    #[tokio::test]
    async fn test_reconcile_trashes_by_default_and_sets_front_page() {
        let pages = MemoryPageRepository::new();
        let options = MemoryOptionsRepository::new();
        let reconciler = PageReconciler::new(&pages, &options, RemovalPolicy::Trash);

        let defs = vec![
            PageDefinition::new("home").with_template("home"),
            PageDefinition::new("about"),
        ];
        let report = reconciler.reconcile(&defs).await.unwrap();
        assert_eq!(report.created, vec!["home", "about"]);
        let home = pages.find_by_slug("home").await.unwrap().unwrap();
        assert_eq!(report.front_page, Some(home.id));
        assert_eq!(
            options.get(FRONT_PAGE_OPTION).await.unwrap(),
            Some(home.id.to_string())
        );

        // Second run with the same definitions changes nothing.
        let plan = reconciler.plan(&defs).await.unwrap();
        assert!(plan.is_empty());

        // Dropping "about" trashes it; dropping "home" clears the front page.
        let report = reconciler
            .reconcile(&[PageDefinition::new("contact")])
            .await
            .unwrap();
        assert_eq!(report.removed, vec!["about", "home"]);
        assert_eq!(report.front_page, None);
        assert_eq!(options.get(FRONT_PAGE_OPTION).await.unwrap(), None);
        let about = pages.find_by_slug("about").await.unwrap().unwrap();
        assert_eq!(about.status, PageStatus::Trashed);
    }

    #[tokio::test]
    async fn test_permanent_removal_deletes() {
        let pages = MemoryPageRepository::new();
        let options = MemoryOptionsRepository::new();
        PageReconciler::new(&pages, &options, RemovalPolicy::Trash)
            .reconcile(&[PageDefinition::new("old")])
            .await
            .unwrap();

        let report = PageReconciler::new(&pages, &options, RemovalPolicy::Permanent)
            .reconcile(&[])
            .await
            .unwrap();
        assert_eq!(report.removed, vec!["old"]);
        assert!(pages.find_by_slug("old").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unmanaged_page_is_adopted_not_duplicated() {
        let pages = MemoryPageRepository::new();
        let options = MemoryOptionsRepository::new();
        let legacy = pages.insert_unmanaged("about", "About", "legacy").await;

        let report = PageReconciler::new(&pages, &options, RemovalPolicy::Trash)
            .reconcile(&[PageDefinition::new("about")])
            .await
            .unwrap();
        assert_eq!(report.updated, vec!["about"]);
        let about = pages.find_by_slug("about").await.unwrap().unwrap();
        assert_eq!(about.id, legacy.id);
        assert!(about.managed);
        assert_eq!(about.template, "page");
        assert_eq!(about.title, "About");
    }

    #[test]
    fn test_collect_from_content() {
        let content = ContentStore::from_sources([
            ("home", "---\ntitle: Welcome\ntemplate: home\n---\n"),
            ("about-us", "About"),
        ]);
        let defs = collect(&content);
        assert_eq!(
            defs,
            vec![
                PageDefinition::new("about-us"),
                PageDefinition::new("home")
                    .with_title("Welcome")
                    .with_template("home"),
            ]
        );
    }
}
