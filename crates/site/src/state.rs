//! Application state shared across handlers.

use std::sync::Arc;

use marquee_core::NavConfig;

use crate::config::SiteConfig;
use crate::content::ContentStore;
use crate::db::{
    AccountRepository, MemoryAccountRepository, MemoryOptionsRepository, MemoryPageRepository,
    OptionsRepository, PageRepository, PgAccountRepository, PgOptionsRepository,
    PgPageRepository,
};
use crate::services::{
    ContentOptions, PageReconciler, ReconcileError, ReconcileReport, SignupSettings, TokenIssuer,
    pages,
};

/// The stores behind the state.
#[derive(Clone)]
pub struct Stores {
    pub accounts: Arc<dyn AccountRepository>,
    pub pages: Arc<dyn PageRepository>,
    pub options: Arc<dyn OptionsRepository>,
}

impl Stores {
    /// In-memory stores.
    #[must_use]
    pub fn memory() -> Self {
        Self {
            accounts: Arc::new(MemoryAccountRepository::new()),
            pages: Arc::new(MemoryPageRepository::new()),
            options: Arc::new(MemoryOptionsRepository::new()),
        }
    }

    /// `PostgreSQL` stores sharing one pool.
    #[must_use]
    pub fn postgres(pool: &sqlx::PgPool) -> Self {
        Self {
            accounts: Arc::new(PgAccountRepository::new(pool.clone())),
            pages: Arc::new(PgPageRepository::new(pool.clone())),
            options: Arc::new(PgOptionsRepository::new(pool.clone())),
        }
    }
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the stores and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: SiteConfig,
    stores: Stores,
    content: ContentStore,
    content_options: ContentOptions,
    tokens: TokenIssuer,
    signup: SignupSettings,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Site configuration
    /// * `stores` - Account, page and option stores
    /// * `content` - Loaded markdown pages
    #[must_use]
    pub fn new(config: SiteConfig, stores: Stores, content: ContentStore) -> Self {
        let tokens = TokenIssuer::new(config.token_secret.clone(), config.token_lifetime_hours);
        let content_options = ContentOptions::new(Arc::clone(&stores.options));

        Self {
            inner: Arc::new(AppStateInner {
                config,
                stores,
                content,
                content_options,
                tokens,
                signup: SignupSettings::default(),
            }),
        }
    }

    /// Reconcile managed pages against the loaded content.
    ///
    /// # Errors
    ///
    /// Returns `ReconcileError` if the page or option store fails.
    pub async fn reconcile_pages(&self) -> Result<ReconcileReport, ReconcileError> {
        let definitions = pages::collect(&self.inner.content);
        self.reconciler().reconcile(&definitions).await
    }

    /// Reconciler over this state's stores.
    #[must_use]
    pub fn reconciler(&self) -> PageReconciler<'_> {
        PageReconciler::new(
            self.inner.stores.pages.as_ref(),
            self.inner.stores.options.as_ref(),
            self.inner.config.page_removal,
        )
    }

    /// Get a reference to the site configuration.
    #[must_use]
    pub fn config(&self) -> &SiteConfig {
        &self.inner.config
    }

    /// Navigation options rendered into every page.
    #[must_use]
    pub fn nav(&self) -> &NavConfig {
        &self.inner.config.nav
    }

    #[must_use]
    pub fn accounts(&self) -> &dyn AccountRepository {
        self.inner.stores.accounts.as_ref()
    }

    #[must_use]
    pub fn pages(&self) -> &dyn PageRepository {
        self.inner.stores.pages.as_ref()
    }

    #[must_use]
    pub fn options(&self) -> &dyn OptionsRepository {
        self.inner.stores.options.as_ref()
    }

    /// Get a reference to the loaded content.
    #[must_use]
    pub fn content(&self) -> &ContentStore {
        &self.inner.content
    }

    /// Editable copy for templates.
    #[must_use]
    pub fn content_options(&self) -> &ContentOptions {
        &self.inner.content_options
    }

    #[must_use]
    pub fn tokens(&self) -> &TokenIssuer {
        &self.inner.tokens
    }

    /// Action and form names of the signup flow.
    #[must_use]
    pub fn signup(&self) -> &SignupSettings {
        &self.inner.signup
    }
}
