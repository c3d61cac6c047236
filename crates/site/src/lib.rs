//! Marquee marketing site library.
//!
//! This crate provides the site as a library so the CLI and the integration
//! tests can build the same router and stores the binary does.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod content;
pub mod db;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use middleware::rate_limit::RateLimiterLayer;
use state::AppState;

/// Build the full application router.
///
/// `ajax_limiter` wraps only the action endpoint. Pass `None` where requests
/// carry no client address, as in tests.
pub fn app(state: AppState, ajax_limiter: Option<RateLimiterLayer>) -> Router {
    let ajax = match ajax_limiter {
        Some(limiter) => routes::ajax_routes().layer(limiter),
        None => routes::ajax_routes(),
    };

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes::page_routes())
        .merge(ajax)
        .layer(axum::middleware::from_fn(
            middleware::security_headers_middleware,
        ))
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the account store is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.accounts().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
