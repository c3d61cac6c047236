//! `PostgreSQL` store tests.
//!
//! These tests require a migrated database:
//! - `SITE_DATABASE_URL` set
//! - `mq-cli migrate` run against it
//!
//! Run with: cargo test -p marquee-integration-tests -- --ignored

#![allow(clippy::unwrap_used)]

use std::time::{SystemTime, UNIX_EPOCH};

use secrecy::SecretString;

use marquee_core::{Email, PageStatus};
use marquee_site::db::{self, RepositoryError};
use marquee_site::services::pages::{FRONT_PAGE_OPTION, HOME_SLUG};
use marquee_site::state::Stores;
use marquee_integration_tests::TestSite;

async fn stores() -> Stores {
    let url = std::env::var("SITE_DATABASE_URL").expect("SITE_DATABASE_URL not set");
    let pool = db::create_pool(&SecretString::from(url))
        .await
        .expect("Failed to connect to database");
    Stores::postgres(&pool)
}

fn unique_email() -> Email {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    Email::parse(&format!("it-{nanos}@example.com")).unwrap()
}

#[tokio::test]
#[ignore = "Requires a migrated PostgreSQL database"]
async fn test_account_create_and_conflict() {
    let stores = stores().await;
    let email = unique_email();

    let account = stores.accounts.create(&email, "hash").await.unwrap();
    assert_eq!(account.email, email);

    let again = stores.accounts.create(&email, "hash").await;
    assert!(matches!(again, Err(RepositoryError::Conflict(_))));

    let updated = stores
        .accounts
        .update_names(account.id, "Ada", "Lovelace")
        .await
        .unwrap();
    assert_eq!(updated.first_name, "Ada");
}

#[tokio::test]
#[ignore = "Requires a migrated PostgreSQL database"]
async fn test_startup_reconciles_pages_and_front_page() {
    let site = TestSite::start_with(stores().await).await.unwrap();

    let home = site
        .state
        .pages()
        .find_by_slug(HOME_SLUG)
        .await
        .unwrap()
        .unwrap();
    assert!(home.managed);
    assert_eq!(home.status, PageStatus::Published);

    let front = site.state.options().get(FRONT_PAGE_OPTION).await.unwrap();
    assert_eq!(front, Some(home.id.to_string()));
}
