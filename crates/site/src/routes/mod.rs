//! HTTP route handlers for the site.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Front page (page_on_front option) or page listing
//! GET  /{slug}                 - Content page
//! POST /ajax                   - Action endpoint (register_email, update_user_details)
//!
//! GET  /health                 - Liveness (mounted in main)
//! GET  /health/ready           - Readiness (mounted in main)
//! ```

pub mod ajax;
pub mod pages;

use axum::{
    Router,
    routing::{get, post},
};

use marquee_core::ajax::DEFAULT_ENDPOINT;

use crate::state::AppState;

/// Create the action endpoint router.
///
/// Kept separate so the rate limiter can wrap only this route.
pub fn ajax_routes() -> Router<AppState> {
    Router::new().route(DEFAULT_ENDPOINT, post(ajax::dispatch))
}

/// Create the content page router.
pub fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(pages::front))
        .route("/{slug}", get(pages::show))
}

/// Create all routes for the site.
pub fn routes() -> Router<AppState> {
    Router::new().merge(page_routes()).merge(ajax_routes())
}

#[cfg(test)]
pub(crate) mod test_support {
    use secrecy::SecretString;

    use crate::config::SiteConfig;
    use crate::content::ContentStore;
    use crate::state::{AppState, Stores};

    /// State over memory stores and a small content set.
    pub fn state() -> AppState {
        let config = SiteConfig::for_local(
            SecretString::from("k8Qz2LwP9vRt4YnB7mXc3JdF6hGs1ZaE"),
            "unused",
        );
        let content = ContentStore::from_sources([
            (
                "home",
                "---\ntitle: Welcome\ntemplate: home\n---\nSomething new is coming.\n",
            ),
            ("about", "---\ntitle: About\n---\nWho we are.\n"),
            ("services", "---\ntitle: Services\n---\nWhat we do.\n"),
        ]);
        AppState::new(config, Stores::memory(), content)
    }

    /// A valid token for the signup flow.
    pub fn token(state: &AppState) -> String {
        state.tokens().issue(&state.signup().token_action)
    }
}
