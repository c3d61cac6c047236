//! Page storage.
//!
//! Pages created from code definitions carry `managed = true`; reconciliation
//! only ever removes managed pages.

use std::collections::BTreeMap;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tokio::sync::RwLock;

use marquee_core::{PageId, PageStatus};

use super::RepositoryError;

/// A persisted page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRecord {
    pub id: PageId,
    pub slug: String,
    pub title: String,
    pub template: String,
    pub status: PageStatus,
    pub managed: bool,
}

/// Fields of a page to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPage {
    pub slug: String,
    pub title: String,
    pub template: String,
}

/// Page persistence.
#[async_trait]
pub trait PageRepository: Send + Sync {
    /// Every page, in slug order.
    async fn list(&self) -> Result<Vec<PageRecord>, RepositoryError>;

    /// Look up a page by slug.
    async fn find_by_slug(&self, slug: &str) -> Result<Option<PageRecord>, RepositoryError>;

    /// Create a published, managed page.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug is taken.
    async fn insert(&self, page: &NewPage) -> Result<PageRecord, RepositoryError>;

    /// Set template, status and the managed flag.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no page has this id.
    async fn update(
        &self,
        id: PageId,
        template: &str,
        status: PageStatus,
        managed: bool,
    ) -> Result<(), RepositoryError>;

    /// Delete a page.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no page has this id.
    async fn delete(&self, id: PageId) -> Result<(), RepositoryError>;
}

// =============================================================================
// PostgreSQL
// =============================================================================

const PAGE_COLUMNS: &str = "id, slug, title, template, status, managed";

/// `PostgreSQL` page store.
#[derive(Debug, Clone)]
pub struct PgPageRepository {
    pool: PgPool,
}

impl PgPageRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn page_from_row(row: &PgRow) -> Result<PageRecord, RepositoryError> {
    let status: String = row.try_get("status")?;
    let status = status
        .parse::<PageStatus>()
        .map_err(|e| RepositoryError::DataCorruption(e.to_string()))?;

    Ok(PageRecord {
        id: PageId::new(row.try_get("id")?),
        slug: row.try_get("slug")?,
        title: row.try_get("title")?,
        template: row.try_get("template")?,
        status,
        managed: row.try_get("managed")?,
    })
}

#[async_trait]
impl PageRepository for PgPageRepository {
    async fn list(&self) -> Result<Vec<PageRecord>, RepositoryError> {
        sqlx::query(&format!("SELECT {PAGE_COLUMNS} FROM site.page ORDER BY slug"))
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(page_from_row)
            .collect()
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<PageRecord>, RepositoryError> {
        sqlx::query(&format!("SELECT {PAGE_COLUMNS} FROM site.page WHERE slug = $1"))
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(page_from_row)
            .transpose()
    }

    async fn insert(&self, page: &NewPage) -> Result<PageRecord, RepositoryError> {
        let row = sqlx::query(&format!(
            "INSERT INTO site.page (slug, title, template, status, managed) \
             VALUES ($1, $2, $3, $4, TRUE) \
             RETURNING {PAGE_COLUMNS}"
        ))
        .bind(&page.slug)
        .bind(&page.title)
        .bind(&page.template)
        .bind(PageStatus::Published.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepositoryError::from_insert(e, "page slug"))?;

        page_from_row(&row)
    }

    async fn update(
        &self,
        id: PageId,
        template: &str,
        status: PageStatus,
        managed: bool,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE site.page \
             SET template = $2, status = $3, managed = $4, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id.as_i32())
        .bind(template)
        .bind(status.as_str())
        .bind(managed)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: PageId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM site.page WHERE id = $1")
            .bind(id.as_i32())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

// =============================================================================
// In-memory
// =============================================================================

#[derive(Debug, Default)]
struct MemoryPages {
    next_id: i32,
    by_slug: BTreeMap<String, PageRecord>,
}

/// In-memory page store.
#[derive(Debug, Default)]
pub struct MemoryPageRepository {
    inner: RwLock<MemoryPages>,
}

impl MemoryPageRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a page that was not created from a definition.
    pub async fn insert_unmanaged(&self, slug: &str, title: &str, template: &str) -> PageRecord {
        let mut inner = self.inner.write().await;
        inner.next_id += 1;
        let record = PageRecord {
            id: PageId::new(inner.next_id),
            slug: slug.to_owned(),
            title: title.to_owned(),
            template: template.to_owned(),
            status: PageStatus::Published,
            managed: false,
        };
        inner.by_slug.insert(record.slug.clone(), record.clone());
        record
    }
}

#[async_trait]
impl PageRepository for MemoryPageRepository {
    async fn list(&self) -> Result<Vec<PageRecord>, RepositoryError> {
        Ok(self.inner.read().await.by_slug.values().cloned().collect())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<PageRecord>, RepositoryError> {
        Ok(self.inner.read().await.by_slug.get(slug).cloned())
    }

    async fn insert(&self, page: &NewPage) -> Result<PageRecord, RepositoryError> {
        let mut inner = self.inner.write().await;
        if inner.by_slug.contains_key(&page.slug) {
            return Err(RepositoryError::Conflict("page slug already exists".to_owned()));
        }

        inner.next_id += 1;
        let record = PageRecord {
            id: PageId::new(inner.next_id),
            slug: page.slug.clone(),
            title: page.title.clone(),
            template: page.template.clone(),
            status: PageStatus::Published,
            managed: true,
        };
        inner.by_slug.insert(record.slug.clone(), record.clone());
        Ok(record)
    }

    async fn update(
        &self,
        id: PageId,
        template: &str,
        status: PageStatus,
        managed: bool,
    ) -> Result<(), RepositoryError> {
        let mut inner = self.inner.write().await;
        let record = inner
            .by_slug
            .values_mut()
            .find(|p| p.id == id)
            .ok_or(RepositoryError::NotFound)?;
        template.clone_into(&mut record.template);
        record.status = status;
        record.managed = managed;
        Ok(())
    }

    async fn delete(&self, id: PageId) -> Result<(), RepositoryError> {
        let mut inner = self.inner.write().await;
        let before = inner.by_slug.len();
        inner.by_slug.retain(|_, p| p.id != id);
        if inner.by_slug.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
