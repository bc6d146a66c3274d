//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tally_core::Month;

/// Tally - Monthly budgets, expense tracking and spending insights
#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Self-hosted monthly budget tracker", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "tally.db", global = true)]
    pub db: PathBuf,

    /// User whose data offline commands read and write
    #[arg(long, default_value = "local-dev", global = true)]
    pub user: String,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for production)
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set TALLY_DB_KEY environment variable with your passphrase.
    /// Use --no-encrypt only for development or testing.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Disable authentication (for local development only)
        ///
        /// WARNING: Do not use this flag when exposing the server to a network.
        /// By default, every request needs the identity header set by your
        /// auth proxy or an API key from TALLY_API_KEYS.
        #[arg(long)]
        no_auth: bool,

        /// Directory containing static files to serve (e.g., ui/dist)
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },

    /// Manage spending categories
    Categories {
        #[command(subcommand)]
        action: Option<CategoriesAction>,
    },

    /// Manage monthly budgets
    Budgets {
        #[command(subcommand)]
        action: BudgetsAction,
    },

    /// Log and list expenses
    Expenses {
        #[command(subcommand)]
        action: ExpensesAction,
    },

    /// Budget vs. actual for a month
    Report {
        /// Month (YYYY-MM)
        #[arg(short, long)]
        month: Month,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Spending anomalies and budget recommendations
    Insights {
        /// Month (YYYY-MM), defaults to the current month
        #[arg(short, long)]
        month: Option<Month>,

        /// Print JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum CategoriesAction {
    /// List categories
    List,

    /// Add a category
    Add {
        /// Category name
        name: String,

        /// Display color (e.g., "#10B981")
        #[arg(long)]
        color: Option<String>,
    },

    /// Delete a category (its budgets and expenses are kept)
    Delete {
        /// Category ID
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum BudgetsAction {
    /// List budgets for a month
    List {
        /// Month (YYYY-MM)
        #[arg(short, long)]
        month: Month,
    },

    /// Create or update the budget for a category and month
    Set {
        /// Category ID
        #[arg(short, long)]
        category: i64,

        /// Month (YYYY-MM)
        #[arg(short, long)]
        month: Month,

        /// Spending limit
        #[arg(short, long, allow_hyphen_values = true)]
        limit: f64,

        /// Sub-item as name:allocated[:type], repeatable; replaces existing items
        ///
        /// Type is "recurring" (default) or "one-off".
        #[arg(long = "item")]
        items: Vec<String>,
    },

    /// Recompute sub-item spend from logged expenses
    Reconcile {
        /// Category ID
        #[arg(short, long)]
        category: i64,

        /// Month (YYYY-MM)
        #[arg(short, long)]
        month: Month,
    },
}

#[derive(Subcommand)]
pub enum ExpensesAction {
    /// List expenses for a month
    List {
        /// Month (YYYY-MM)
        #[arg(short, long)]
        month: Month,
    },

    /// Log an expense
    Add {
        /// Category ID
        #[arg(short, long)]
        category: i64,

        /// Amount spent
        #[arg(short, long)]
        amount: f64,

        /// Date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<String>,

        /// Budget sub-item this expense counts toward
        #[arg(long)]
        item: Option<String>,
    },
}
