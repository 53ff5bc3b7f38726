//! Subcart CLI - Database migrations and scheduled maintenance.
//!
//! # Usage
//!
//! ```bash
//! # Run cart database migrations
//! subcart-cli migrate
//!
//! # Flip overdue subscriptions to expired (run from cron)
//! subcart-cli sweep
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `sweep` - Expire overdue purchased subscriptions once and exit

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "subcart-cli")]
#[command(author, version, about = "Subcart CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run cart database migrations
    Migrate,
    /// Flip overdue purchased subscriptions to expired
    Sweep,
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
        Commands::Sweep => commands::sweep::run().await?,
    }
    Ok(())
}
