//! Database migration commands.
//!
//! Migrations live in `crates/site/migrations/` and are embedded at compile
//! time.

use super::{CommandError, connect};

/// Run site database migrations.
///
/// # Errors
///
/// Returns an error if the database URL is missing, the connection fails,
/// or a migration fails.
pub async fn site() -> Result<(), CommandError> {
    let pool = connect().await?;

    tracing::info!("Running site migrations...");
    sqlx::migrate!("../site/migrations").run(&pool).await?;

    tracing::info!("Site migrations complete!");
    Ok(())
}
