//! Tally CLI - Monthly budget tracker
//!
//! Usage:
//!   tally init                                   Initialize database
//!   tally serve --port 3000                      Start web server
//!   tally budgets set -c 1 -m 2025-03 -l 400     Set a budget
//!   tally expenses add -c 1 -a 12.50             Log an expense
//!   tally report -m 2025-03                      Budget vs. actual

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

    let user = cli.user.as_str();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db, cli.no_encrypt),
        Commands::Serve {
            port,
            host,
            no_auth,
            static_dir,
        } => {
            commands::cmd_serve(
                &cli.db,
                &host,
                port,
                no_auth,
                cli.no_encrypt,
                static_dir.as_deref(),
            )
            .await
        }
        Commands::Categories { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None | Some(CategoriesAction::List) => commands::cmd_categories_list(&db, user),
                Some(CategoriesAction::Add { name, color }) => {
                    commands::cmd_categories_add(&db, user, &name, color.as_deref())
                }
                Some(CategoriesAction::Delete { id }) => {
                    commands::cmd_categories_delete(&db, user, id)
                }
            }
        }
        Commands::Budgets { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                BudgetsAction::List { month } => commands::cmd_budgets_list(&db, user, month),
                BudgetsAction::Set {
                    category,
                    month,
                    limit,
                    items,
                } => commands::cmd_budgets_set(&db, user, category, month, limit, &items),
                BudgetsAction::Reconcile { category, month } => {
                    commands::cmd_budgets_reconcile(&db, user, category, month)
                }
            }
        }
        Commands::Expenses { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                ExpensesAction::List { month } => commands::cmd_expenses_list(&db, user, month),
                ExpensesAction::Add {
                    category,
                    amount,
                    date,
                    item,
                } => commands::cmd_expenses_add(
                    &db,
                    user,
                    category,
                    amount,
                    date.as_deref(),
                    item.as_deref(),
                ),
            }
        }
        Commands::Report { month, json } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_report(&db, user, month, json)
        }
        Commands::Insights { month, json } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_insights(&db, user, month, json)
        }
    }
}
