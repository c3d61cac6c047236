//! Account storage.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tokio::sync::RwLock;

use marquee_core::{AccountId, Email};

use super::RepositoryError;

/// A signup account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: AccountId,
    pub email: Email,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Account persistence.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Create an account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email is already registered.
    async fn create(&self, email: &Email, password_hash: &str) -> Result<Account, RepositoryError>;

    /// Look up an account by email.
    async fn find_by_email(&self, email: &Email) -> Result<Option<Account>, RepositoryError>;

    /// Look up an account by id.
    async fn get(&self, id: AccountId) -> Result<Option<Account>, RepositoryError>;

    /// Overwrite both name fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no account has this id.
    async fn update_names(
        &self,
        id: AccountId,
        first_name: &str,
        last_name: &str,
    ) -> Result<Account, RepositoryError>;

    /// Check the store is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

// =============================================================================
// PostgreSQL
// =============================================================================

const ACCOUNT_COLUMNS: &str = "id, email, first_name, last_name, created_at, updated_at";

/// `PostgreSQL` account store.
#[derive(Debug, Clone)]
pub struct PgAccountRepository {
    pool: PgPool,
}

impl PgAccountRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn account_from_row(row: &PgRow) -> Result<Account, RepositoryError> {
    let email: String = row.try_get("email")?;
    let email = Email::parse(&email)
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid email in database: {e}")))?;

    Ok(Account {
        id: AccountId::new(row.try_get("id")?),
        email,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl AccountRepository for PgAccountRepository {
    async fn create(&self, email: &Email, password_hash: &str) -> Result<Account, RepositoryError> {
        let row = sqlx::query(&format!(
            "INSERT INTO site.account (email, password_hash) VALUES ($1, $2) \
             RETURNING {ACCOUNT_COLUMNS}"
        ))
        .bind(email.as_str())
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepositoryError::from_insert(e, "email"))?;

        account_from_row(&row)
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<Account>, RepositoryError> {
        sqlx::query(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM site.account WHERE email = $1"
        ))
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?
        .as_ref()
        .map(account_from_row)
        .transpose()
    }

    async fn get(&self, id: AccountId) -> Result<Option<Account>, RepositoryError> {
        sqlx::query(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM site.account WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(&self.pool)
        .await?
        .as_ref()
        .map(account_from_row)
        .transpose()
    }

    async fn update_names(
        &self,
        id: AccountId,
        first_name: &str,
        last_name: &str,
    ) -> Result<Account, RepositoryError> {
        let row = sqlx::query(&format!(
            "UPDATE site.account \
             SET first_name = $2, last_name = $3, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {ACCOUNT_COLUMNS}"
        ))
        .bind(id.as_i32())
        .bind(first_name)
        .bind(last_name)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        account_from_row(&row)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

// =============================================================================
// In-memory
// =============================================================================

#[derive(Debug, Default)]
struct MemoryAccounts {
    next_id: i32,
    by_id: HashMap<AccountId, (Account, String)>,
}

/// In-memory account store.
#[derive(Debug, Default)]
pub struct MemoryAccountRepository {
    inner: RwLock<MemoryAccounts>,
}

impl MemoryAccountRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored password hash of an account.
    pub async fn password_hash(&self, id: AccountId) -> Option<String> {
        self.inner
            .read()
            .await
            .by_id
            .get(&id)
            .map(|(_, hash)| hash.clone())
    }

    /// Number of stored accounts.
    pub async fn len(&self) -> usize {
        self.inner.read().await.by_id.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl AccountRepository for MemoryAccountRepository {
    async fn create(&self, email: &Email, password_hash: &str) -> Result<Account, RepositoryError> {
        let mut inner = self.inner.write().await;
        if inner.by_id.values().any(|(a, _)| &a.email == email) {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        inner.next_id += 1;
        let now = Utc::now();
        let account = Account {
            id: AccountId::new(inner.next_id),
            email: email.clone(),
            first_name: String::new(),
            last_name: String::new(),
            created_at: now,
            updated_at: now,
        };
        inner
            .by_id
            .insert(account.id, (account.clone(), password_hash.to_owned()));
        Ok(account)
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<Account>, RepositoryError> {
        Ok(self
            .inner
            .read()
            .await
            .by_id
            .values()
            .find(|(a, _)| &a.email == email)
            .map(|(a, _)| a.clone()))
    }

    async fn get(&self, id: AccountId) -> Result<Option<Account>, RepositoryError> {
        Ok(self.inner.read().await.by_id.get(&id).map(|(a, _)| a.clone()))
    }

    async fn update_names(
        &self,
        id: AccountId,
        first_name: &str,
        last_name: &str,
    ) -> Result<Account, RepositoryError> {
        let mut inner = self.inner.write().await;
        let (account, _) = inner.by_id.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        first_name.clone_into(&mut account.first_name);
        last_name.clone_into(&mut account.last_name);
        account.updated_at = Utc::now();
        Ok(account.clone())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}
