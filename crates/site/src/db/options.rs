//! Key/value site options.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::RwLock;

use super::RepositoryError;

/// Option persistence.
#[async_trait]
pub trait OptionsRepository: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, RepositoryError>;

    /// Insert or overwrite.
    async fn set(&self, key: &str, value: &str) -> Result<(), RepositoryError>;

    /// Remove; a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), RepositoryError>;
}

/// `PostgreSQL` option store.
#[derive(Debug, Clone)]
pub struct PgOptionsRepository {
    pool: PgPool,
}

impl PgOptionsRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OptionsRepository for PgOptionsRepository {
    async fn get(&self, key: &str) -> Result<Option<String>, RepositoryError> {
        let value = sqlx::query_scalar::<_, String>("SELECT value FROM site.option WHERE key = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO site.option (key, value) VALUES ($1, $2) \
             ON CONFLICT (key) DO UPDATE SET value = $2, updated_at = NOW()",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM site.option WHERE key = $1")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

/// In-memory option store.
#[derive(Debug, Default)]
pub struct MemoryOptionsRepository {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryOptionsRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OptionsRepository for MemoryOptionsRepository {
    async fn get(&self, key: &str) -> Result<Option<String>, RepositoryError> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), RepositoryError> {
        self.values
            .write()
            .await
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), RepositoryError> {
        self.values.write().await.remove(key);
        Ok(())
    }
}
