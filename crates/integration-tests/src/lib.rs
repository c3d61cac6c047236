//! Integration tests for Marquee.
//!
//! # Running Tests
//!
//! ```bash
//! # In-memory tests
//! cargo test -p marquee-integration-tests
//!
//! # Database tests (need SITE_DATABASE_URL pointing at a migrated database)
//! cargo test -p marquee-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `navigation` - Navigation controller against the real site
//! - `signup` - Two-step signup against the real action endpoint
//! - `database` - `PostgreSQL` stores and page reconciliation

use std::net::SocketAddr;
use std::path::PathBuf;

use secrecy::SecretString;
use url::Url;

use marquee_site::config::SiteConfig;
use marquee_site::content::ContentStore;
use marquee_site::state::{AppState, Stores};

/// Token secret used by every test site.
pub const TEST_TOKEN_SECRET: &str = "Vq7Lr2Xn9Bd4Hs8Kw3Pz6Tm1Yc5Gf0Ja";

/// A site running on an ephemeral port.
pub struct TestSite {
    pub addr: SocketAddr,
    pub state: AppState,
    server: tokio::task::JoinHandle<()>,
}

impl TestSite {
    /// Serve the bundled content over in-memory stores.
    ///
    /// Managed pages are reconciled before the first request, as the binary
    /// does at start-up.
    ///
    /// # Errors
    ///
    /// Returns an error if content cannot be loaded, pages cannot be
    /// reconciled, or the listener cannot bind.
    pub async fn start() -> Result<Self, Box<dyn std::error::Error>> {
        Self::start_with(Stores::memory()).await
    }

    /// Serve the bundled content over the given stores.
    ///
    /// # Errors
    ///
    /// See [`Self::start`].
    pub async fn start_with(stores: Stores) -> Result<Self, Box<dyn std::error::Error>> {
        let config = SiteConfig::for_local(SecretString::from(TEST_TOKEN_SECRET), content_dir());
        let content = ContentStore::load(&config.content_dir)?;
        let state = AppState::new(config, stores, content);
        state.reconcile_pages().await?;

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let app = marquee_site::app(state.clone(), None);
        let server = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(error = %e, "test site stopped");
            }
        });

        Ok(Self {
            addr,
            state,
            server,
        })
    }

    /// Absolute URL of `path` on this site.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` does not form a valid URL.
    pub fn url(&self, path: &str) -> Result<Url, url::ParseError> {
        Url::parse(&format!("http://{}{path}", self.addr))
    }
}

impl Drop for TestSite {
    fn drop(&mut self) {
        self.server.abort();
    }
}

/// Content directory of the site crate.
#[must_use]
pub fn content_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../site/content")
}
