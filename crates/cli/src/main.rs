//! Chapterhouse CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! ch-cli migrate
//!
//! # Create (or promote) the default admin user
//! ch-cli admin create -e admin@example.com -p 'str0ng!password'
//!
//! # Seed the catalog with sample data (no-op when books exist)
//! ch-cli seed catalog
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `admin create` - Create admin users (idempotent)
//! - `seed catalog` - Seed the catalog with sample books

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "ch-cli")]
#[command(author, version, about = "Chapterhouse CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage admin users
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Seed the database with sample data
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new admin user (or promote an existing account)
    Create {
        /// Admin email address
        #[arg(short, long)]
        email: String,

        /// Admin password (only used when the account doesn't exist yet)
        #[arg(short, long)]
        password: String,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Seed sample genres, authors, publishers, and books
    Catalog,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
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
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Admin { action } => match action {
            AdminAction::Create { email, password } => {
                commands::admin::create_user(&email, &password).await?;
            }
        },
        Commands::Seed { target } => match target {
            SeedTarget::Catalog => commands::seed::catalog().await?,
        },
    }
    Ok(())
}
