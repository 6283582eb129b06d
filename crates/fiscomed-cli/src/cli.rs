//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Fiscomed - classify and validate fiscal transactions for medical practices
#[derive(Parser)]
#[command(name = "fiscomed")]
#[command(about = "Fiscal transaction classifier for Mexican medical practices", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "fiscomed.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for production)
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set FISCOMED_DB_KEY environment variable with your passphrase.
    /// Use --no-encrypt only for development or testing.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    /// Owner (physician) identifier
    #[arg(long, default_value = "default", global = true)]
    pub owner: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Record a transaction (the engine attaches a suggestion)
    Add {
        /// Transaction kind: income or expense
        #[arg(short, long)]
        kind: String,

        /// Amount (positive)
        #[arg(short, long)]
        amount: f64,

        /// Free-text concept
        #[arg(short, long)]
        concept: String,

        /// Provider name
        #[arg(short, long, default_value = "")]
        provider: String,

        /// Date (YYYY-MM-DD, defaults to today)
        #[arg(short, long)]
        date: Option<String>,

        /// SAT payment-method code or "CODE - Description" label
        #[arg(short = 'm', long, default_value = "99 - Por definir")]
        payment_method: String,

        /// CFDI (fiscal document) UUID, used for duplicate detection
        #[arg(long)]
        cfdi_uuid: Option<String>,

        /// Manual classification (wins over the engine when valid)
        #[arg(long)]
        classification: Option<String>,
    },

    /// Classify a concept without persisting anything
    Classify {
        /// Free-text concept
        concept: String,

        /// Provider name
        #[arg(short, long, default_value = "")]
        provider: String,

        /// Transaction kind: income or expense
        #[arg(short, long, default_value = "expense")]
        kind: String,

        /// Amount, passed to the advisor for context
        #[arg(short, long, default_value = "0")]
        amount: f64,
    },

    /// Apply an accountant decision to a transaction
    Validate {
        /// Transaction ID
        id: i64,

        /// Decision: approved, rejected, or adjusted
        #[arg(short, long)]
        status: String,

        /// Confirmed classification
        #[arg(short, long)]
        classification: Option<String>,

        /// Explicit percentage (wins over the catalog default)
        #[arg(long)]
        percentage: Option<i64>,

        /// Accountant notes
        #[arg(short, long)]
        notes: Option<String>,

        /// Validator identity
        #[arg(long, default_value = "contador")]
        validator: String,
    },

    /// List transactions
    Transactions {
        /// Maximum rows to show
        #[arg(short, long, default_value = "20")]
        limit: i64,

        /// Filter by status: pending, approved, rejected, adjusted
        #[arg(short, long)]
        status: Option<String>,
    },

    /// List learned classification rules
    Rules {
        /// Maximum rows to show
        #[arg(short, long, default_value = "50")]
        limit: i64,
    },

    /// Show the financial summary
    Summary,

    /// Populate the database with demo transactions and rules
    Seed,

    /// Show database status (encryption, counts)
    Status,

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Allowed CORS origins (repeatable)
        #[arg(long)]
        allow_origin: Vec<String>,
    },
}
