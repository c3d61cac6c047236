//! Content page route handlers.
//!
//! Pages come from the markdown content store. A page whose record has been
//! trashed or drafted by reconciliation is not served.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::instrument;

use marquee_core::ajax::DEFAULT_ENDPOINT;
use marquee_core::{PageId, PageStatus};

use crate::content::Page;
use crate::db::PageRecord;
use crate::error::{AppError, Result};
use crate::filters;
use crate::services::pages::{FRONT_PAGE_OPTION, HOME_SLUG};
use crate::state::AppState;

/// Template name that renders the signup form.
const HOME_TEMPLATE: &str = "home";

/// Link in the site navigation.
#[derive(Debug, Clone)]
pub struct NavLink {
    pub href: String,
    pub title: String,
}

/// Values every page shares through `base.html`.
#[derive(Debug, Clone)]
pub struct Layout {
    pub title: String,
    pub description: String,
    pub nav_json: String,
    pub links: Vec<NavLink>,
}

/// Names and token of the signup form and its profile modal.
#[derive(Debug, Clone)]
pub struct SignupMarkup {
    pub endpoint: &'static str,
    pub form_id: String,
    pub modal_id: String,
    pub register_action: String,
    pub update_action: String,
    pub token_action: String,
    pub token: String,
}

/// Plain content page.
#[derive(Template, WebTemplate)]
#[template(path = "page.html")]
pub struct PageTemplate {
    pub layout: Layout,
    pub page_title: String,
    pub content_html: String,
}

/// Front page with the email signup.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub layout: Layout,
    pub headline: String,
    pub subheadline: String,
    pub content_html: String,
    pub signup: SignupMarkup,
}

/// Page listing, shown at `/` when no front page is set.
#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub layout: Layout,
    pub pages: Vec<NavLink>,
}

/// Not found page.
#[derive(Template, WebTemplate)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate {
    pub layout: Layout,
}

/// Display the front page, or the page listing if none is set.
///
/// # Errors
///
/// Returns an error if the page or option store fails.
#[instrument(skip(state))]
pub async fn front(State(state): State<AppState>) -> Result<Response> {
    let records = state.pages().list().await?;

    let front = state
        .options()
        .get(FRONT_PAGE_OPTION)
        .await?
        .and_then(|value| value.trim().parse::<i32>().ok())
        .map(PageId::new)
        .and_then(|id| records.iter().find(|record| record.id == id))
        .filter(|record| record.status == PageStatus::Published)
        .and_then(|record| state.content().get_page(&record.slug));

    if let Some(page) = front {
        return render_page(&state, &records, page).await;
    }

    let links = nav_links(&state, &records);
    let layout = layout(&state, "Pages", "", links.clone())?;
    Ok(IndexTemplate {
        layout,
        pages: links,
    }
    .into_response())
}

/// Display a content page by slug.
///
/// # Errors
///
/// Returns an error if the page store fails.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(slug): Path<String>) -> Result<Response> {
    let records = state.pages().list().await?;

    let Some(page) = state.content().get_page(&slug) else {
        return not_found(&state, &records);
    };
    if !is_served(&records, &page.slug) {
        return not_found(&state, &records);
    }

    render_page(&state, &records, page).await
}

async fn render_page(state: &AppState, records: &[PageRecord], page: &Page) -> Result<Response> {
    let layout = layout(state, &page.title, &page.description, nav_links(state, records))?;

    if page.template != HOME_TEMPLATE {
        return Ok(PageTemplate {
            layout,
            page_title: page.title.clone(),
            content_html: page.content_html.clone(),
        }
        .into_response());
    }

    let settings = state.signup();
    let options = state.content_options();
    Ok(HomeTemplate {
        layout,
        headline: options.text("home_headline", &page.title).await,
        subheadline: options
            .text("home_subheadline", "Join the list for launch news.")
            .await,
        content_html: page.content_html.clone(),
        signup: SignupMarkup {
            endpoint: DEFAULT_ENDPOINT,
            form_id: settings.form_id.clone(),
            modal_id: settings.modal_id(),
            register_action: settings.register_action.clone(),
            update_action: settings.update_action.clone(),
            token_action: settings.token_action.clone(),
            token: state.tokens().issue(&settings.token_action),
        },
    }
    .into_response())
}

fn not_found(state: &AppState, records: &[PageRecord]) -> Result<Response> {
    let layout = layout(state, "Page Not Found", "", nav_links(state, records))?;
    Ok((StatusCode::NOT_FOUND, NotFoundTemplate { layout }).into_response())
}

/// A page is served unless its record exists and is not published.
fn is_served(records: &[PageRecord], slug: &str) -> bool {
    records
        .iter()
        .find(|record| record.slug == slug)
        .is_none_or(|record| record.status == PageStatus::Published)
}

fn nav_links(state: &AppState, records: &[PageRecord]) -> Vec<NavLink> {
    state
        .content()
        .pages()
        .filter(|page| is_served(records, &page.slug))
        .map(|page| NavLink {
            href: if page.slug == HOME_SLUG {
                "/".to_owned()
            } else {
                format!("/{}", page.slug)
            },
            title: page.title.clone(),
        })
        .collect()
}

fn layout(state: &AppState, title: &str, description: &str, links: Vec<NavLink>) -> Result<Layout> {
    let nav_json = serde_json::to_string(state.nav())
        .map_err(|e| AppError::Internal(format!("Failed to encode navigation config: {e}")))?;

    Ok(Layout {
        title: title.to_owned(),
        description: description.to_owned(),
        nav_json,
        links,
    })
}
