//! Managed-page commands.
//!
//! Both commands load the content directory, collect the page definitions
//! and diff them against the page store. `plan` prints the result; `sync`
//! applies it.

use std::path::PathBuf;

use marquee_site::config::RemovalPolicy;
use marquee_site::content::ContentStore;
use marquee_site::db::{PgOptionsRepository, PgPageRepository};
use marquee_site::services::{PageReconciler, ReconcilePlan, pages};

use super::{CommandError, connect};

const DEFAULT_CONTENT_DIR: &str = "crates/site/content";

/// Print the reconciliation plan.
///
/// # Errors
///
/// Returns an error if the database or content cannot be read.
pub async fn plan() -> Result<(), CommandError> {
    let removal = removal_policy(false)?;
    let pool = connect().await?;
    let page_store = PgPageRepository::new(pool.clone());
    let option_store = PgOptionsRepository::new(pool);
    let reconciler = PageReconciler::new(&page_store, &option_store, removal);

    let definitions = pages::collect(&load_content()?);
    let plan = reconciler.plan(&definitions).await?;

    print_plan(&plan);
    Ok(())
}

/// Apply the reconciliation plan.
///
/// # Errors
///
/// Returns an error if the database or content cannot be read, or a page
/// change fails.
pub async fn sync(permanent: bool) -> Result<(), CommandError> {
    let removal = removal_policy(permanent)?;
    let pool = connect().await?;
    let page_store = PgPageRepository::new(pool.clone());
    let option_store = PgOptionsRepository::new(pool);
    let reconciler = PageReconciler::new(&page_store, &option_store, removal);

    let definitions = pages::collect(&load_content()?);
    let report = reconciler.reconcile(&definitions).await?;

    tracing::info!(
        created = report.created.len(),
        updated = report.updated.len(),
        removed = report.removed.len(),
        front_page = ?report.front_page,
        "Managed pages reconciled"
    );
    Ok(())
}

fn load_content() -> Result<ContentStore, CommandError> {
    let dir = std::env::var("SITE_CONTENT_DIR")
        .map_or_else(|_| PathBuf::from(DEFAULT_CONTENT_DIR), PathBuf::from);
    tracing::info!(dir = %dir.display(), "Loading content");
    Ok(ContentStore::load(&dir)?)
}

/// `--permanent` wins; otherwise `SITE_PAGE_REMOVAL`, defaulting to trash.
fn removal_policy(permanent: bool) -> Result<RemovalPolicy, CommandError> {
    if permanent {
        return Ok(RemovalPolicy::Permanent);
    }
    std::env::var("SITE_PAGE_REMOVAL").map_or(Ok(RemovalPolicy::Trash), |value| {
        value
            .parse()
            .map_err(|e: String| CommandError::InvalidEnvVar("SITE_PAGE_REMOVAL", e))
    })
}

#[allow(clippy::print_stdout)]
fn print_plan(plan: &ReconcilePlan) {
    if plan.is_empty() {
        println!("Pages are up to date.");
        return;
    }

    for page in &plan.create {
        println!("  create  {} ({}, template {})", page.slug, page.title, page.template);
    }
    for change in &plan.update {
        let reason = if change.adopts() {
            "adopt"
        } else if change.restores() {
            "restore"
        } else {
            "template"
        };
        println!(
            "  update  {} ({reason}, template {})",
            change.record.slug, change.template
        );
    }
    let verb = match plan.removal {
        RemovalPolicy::Trash => "trash",
        RemovalPolicy::Permanent => "delete",
    };
    for page in &plan.remove {
        println!("  {verb:<7} {}", page.slug);
    }
}
