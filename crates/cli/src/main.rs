//! Marquee CLI - Database migrations and managed-page tools.
//!
//! # Usage
//!
//! ```bash
//! # Run site database migrations
//! mq-cli migrate
//!
//! # Show what page reconciliation would change
//! mq-cli pages plan
//!
//! # Reconcile managed pages, deleting removed pages instead of trashing them
//! mq-cli pages sync --permanent
//! ```
//!
//! # Environment Variables
//!
//! - `SITE_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string
//! - `SITE_CONTENT_DIR` - Content directory (default `crates/site/content`)
//! - `SITE_PAGE_REMOVAL` - `trash` or `permanent` (default `trash`)

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "mq-cli")]
#[command(author, version, about = "Marquee CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Reconcile managed pages with the content directory
    Pages {
        #[command(subcommand)]
        action: PagesAction,
    },
}

#[derive(Subcommand)]
enum PagesAction {
    /// Print the reconciliation plan without applying it
    Plan,
    /// Apply the reconciliation plan
    Sync {
        /// Delete removed pages instead of trashing them
        #[arg(long)]
        permanent: bool,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::site().await?,
        Commands::Pages { action } => match action {
            PagesAction::Plan => commands::pages::plan().await?,
            PagesAction::Sync { permanent } => commands::pages::sync(permanent).await?,
        },
    }
    Ok(())
}
