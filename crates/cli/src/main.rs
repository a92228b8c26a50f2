//! Simea CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront database migrations (including the session table)
//! simea-cli migrate
//!
//! # Load the built-in catalog into an empty products table
//! simea-cli seed catalog
//!
//! # Produce a value for ADMIN_PASSWORD_HASH
//! simea-cli admin hash-password
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "simea-cli")]
#[command(author, version, about = "Simea CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the database
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
    /// Manage the admin account
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Insert the built-in catalog
    Catalog {
        /// Insert even if the products table is not empty
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Hash a password for ADMIN_PASSWORD_HASH
    HashPassword {
        /// Password to hash (read from `ADMIN_PASSWORD` when omitted)
        #[arg(short, long)]
        password: Option<String>,
    },
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
        Commands::Migrate => commands::migrate::storefront().await?,
        Commands::Seed { target } => match target {
            SeedTarget::Catalog { force } => {
                commands::seed::catalog(force).await?;
            }
        },
        Commands::Admin { action } => match action {
            AdminAction::HashPassword { password } => {
                commands::admin::hash_password(password)?;
            }
        },
    }
    Ok(())
}
