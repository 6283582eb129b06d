//! Fiscomed CLI - fiscal transaction classifier
//!
//! Usage:
//!   fiscomed init                       Initialize database
//!   fiscomed add --kind expense ...     Record a transaction
//!   fiscomed classify "Gasolina"        Test a classification
//!   fiscomed validate 3 -s approved     Apply an accountant decision
//!   fiscomed serve --port 3000          Start web server

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db, cli.no_encrypt),
        Commands::Add {
            kind,
            amount,
            concept,
            provider,
            date,
            payment_method,
            cfdi_uuid,
            classification,
        } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_add(
                &db,
                &cli.owner,
                &kind,
                amount,
                &concept,
                &provider,
                date.as_deref(),
                &payment_method,
                cfdi_uuid.as_deref(),
                classification,
            )
            .await
        }
        Commands::Classify {
            concept,
            provider,
            kind,
            amount,
        } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_classify(&db, &cli.owner, &concept, &provider, &kind, amount).await
        }
        Commands::Validate {
            id,
            status,
            classification,
            percentage,
            notes,
            validator,
        } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_validate(&db, id, &status, classification, percentage, notes, &validator)
        }
        Commands::Transactions { limit, status } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_transactions(&db, &cli.owner, limit, status.as_deref())
        }
        Commands::Rules { limit } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_rules(&db, &cli.owner, limit)
        }
        Commands::Summary => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_summary(&db, &cli.owner)
        }
        Commands::Seed => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_seed(&db, &cli.owner).await
        }
        Commands::Status => commands::cmd_status(&cli.db, cli.no_encrypt),
        Commands::Serve {
            port,
            host,
            allow_origin,
        } => commands::cmd_serve(&cli.db, &host, port, allow_origin, cli.no_encrypt).await,
    }
}
