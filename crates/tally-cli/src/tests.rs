//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use clap::Parser;
use tally_core::db::Database;
use tally_core::models::{BudgetItemType, NewCategory};
use tally_core::Month;
use tempfile::TempDir;

use crate::cli::{BudgetsAction, Cli, Commands};
use crate::commands::{self, truncate};

const USER: &str = "local-dev";

fn setup_test_db() -> (Database, i64) {
    let db = Database::in_memory().unwrap();
    let food = db
        .create_category(
            USER,
            &NewCategory {
                name: "Food".to_string(),
                color: None,
            },
        )
        .unwrap();
    (db, food.id)
}

fn march() -> Month {
    "2025-03".parse().unwrap()
}

// ========== Init Command Tests ==========

#[test]
fn test_cmd_init_unencrypted() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tally.db");

    commands::cmd_init(&path, true).unwrap();
    assert!(path.exists());

    let db = commands::open_db(&path, true).unwrap();
    assert!(!db.is_encrypted());
    assert!(db.list_categories(USER).unwrap().is_empty());
}

// ========== Categories Command Tests ==========

#[test]
fn test_cmd_categories_add_and_list() {
    let (db, _) = setup_test_db();

    commands::cmd_categories_add(&db, USER, "Rent", Some("#10B981")).unwrap();
    commands::cmd_categories_list(&db, USER).unwrap();

    let categories = db.list_categories(USER).unwrap();
    assert_eq!(categories.len(), 2);
    assert_eq!(categories[1].name, "Rent");
    assert_eq!(categories[1].color, "#10B981");
}

#[test]
fn test_cmd_categories_delete_missing() {
    let (db, _) = setup_test_db();
    assert!(commands::cmd_categories_delete(&db, USER, 9999).is_err());
    assert!(commands::cmd_categories_delete(&db, "someone-else", 1).is_err());
}

// ========== Budgets Command Tests ==========

#[test]
fn test_parse_budget_item() {
    let item = commands::parse_budget_item("Coffee:60").unwrap();
    assert_eq!(item.name, "Coffee");
    assert_eq!(item.allocated, 60.0);
    assert_eq!(item.item_type, BudgetItemType::Recurring);

    let item = commands::parse_budget_item("Cake:40:one-off").unwrap();
    assert_eq!(item.item_type, BudgetItemType::OneOff);

    let item = commands::parse_budget_item("Snacks:15:daily").unwrap();
    assert_eq!(item.item_type, BudgetItemType::Recurring);

    assert!(commands::parse_budget_item("Coffee").is_err());
    assert!(commands::parse_budget_item("Coffee:lots").is_err());
    assert!(commands::parse_budget_item(":10").is_err());
    assert!(commands::parse_budget_item("Coffee:10:weekly").is_err());
}

#[test]
fn test_cmd_budgets_set_and_list() {
    let (db, food) = setup_test_db();

    let items = vec!["Coffee:60".to_string(), "Cake:40:one-off".to_string()];
    commands::cmd_budgets_set(&db, USER, food, march(), 400.0, &items).unwrap();

    // Without --item the existing items stay
    commands::cmd_budgets_set(&db, USER, food, march(), 450.0, &[]).unwrap();
    commands::cmd_budgets_list(&db, USER, march()).unwrap();

    let budget = db.get_budget(USER, food, march()).unwrap().unwrap();
    assert_eq!(budget.limit, 450.0);
    assert_eq!(budget.items.len(), 2);
}

#[test]
fn test_cmd_budgets_set_bad_item_writes_nothing() {
    let (db, food) = setup_test_db();

    let items = vec!["Coffee".to_string()];
    assert!(commands::cmd_budgets_set(&db, USER, food, march(), 400.0, &items).is_err());
    assert!(db.get_budget(USER, food, march()).unwrap().is_none());
}

#[test]
fn test_cmd_budgets_reconcile() {
    let (db, food) = setup_test_db();

    commands::cmd_expenses_add(&db, USER, food, 4.0, Some("2025-03-02"), Some("coffee")).unwrap();
    let items = vec!["Coffee:60".to_string()];
    commands::cmd_budgets_set(&db, USER, food, march(), 400.0, &items).unwrap();

    commands::cmd_budgets_reconcile(&db, USER, food, march()).unwrap();

    let budget = db.get_budget(USER, food, march()).unwrap().unwrap();
    assert_eq!(budget.items[0].spent, 4.0);
}

#[test]
fn test_cmd_budgets_reconcile_missing_budget() {
    let (db, food) = setup_test_db();
    assert!(commands::cmd_budgets_reconcile(&db, USER, food, march()).is_err());
}

// ========== Expenses Command Tests ==========

#[test]
fn test_cmd_expenses_add_and_list() {
    let (db, food) = setup_test_db();

    commands::cmd_budgets_set(&db, USER, food, march(), 100.0, &[]).unwrap();
    commands::cmd_expenses_add(&db, USER, food, 80.0, Some("2025-03-05"), None).unwrap();
    commands::cmd_expenses_add(&db, USER, food, 30.0, Some("2025-03-06"), None).unwrap();
    commands::cmd_expenses_list(&db, USER, march()).unwrap();

    let expenses = db.list_expenses_for_month(USER, march()).unwrap();
    assert_eq!(expenses.len(), 2);
}

#[test]
fn test_cmd_expenses_add_rejects_bad_input() {
    let (db, food) = setup_test_db();

    assert!(commands::cmd_expenses_add(&db, USER, food, 0.0, Some("2025-03-05"), None).is_err());
    assert!(commands::cmd_expenses_add(&db, USER, food, 5.0, Some("March 5"), None).is_err());
    assert!(db.list_expenses_for_month(USER, march()).unwrap().is_empty());
}

#[test]
fn test_cmd_expenses_add_defaults_to_today() {
    let (db, food) = setup_test_db();

    commands::cmd_expenses_add(&db, USER, food, 5.0, None, None).unwrap();

    let expenses = db.list_expenses_for_month(USER, Month::current()).unwrap();
    assert_eq!(expenses.len(), 1);
}

// ========== Report Command Tests ==========

#[test]
fn test_cmd_report_and_insights() {
    let (db, food) = setup_test_db();
    commands::cmd_expenses_add(&db, USER, food, 25.0, Some("2025-03-05"), None).unwrap();

    assert!(commands::cmd_report(&db, USER, march(), false).is_ok());
    assert!(commands::cmd_report(&db, USER, march(), true).is_ok());
    assert!(commands::cmd_insights(&db, USER, Some(march().next()), false).is_ok());
    assert!(commands::cmd_insights(&db, USER, None, true).is_ok());
}

// ========== Argument Parsing Tests ==========

#[test]
fn test_cli_parses_budget_set() {
    let cli = Cli::try_parse_from([
        "tally",
        "--no-encrypt",
        "budgets",
        "set",
        "--category",
        "3",
        "--month",
        "2025-03",
        "--limit",
        "-10",
        "--item",
        "Coffee:60",
        "--item",
        "Cake:40:one-off",
        "--user",
        "alice",
    ])
    .unwrap();

    assert!(cli.no_encrypt);
    assert_eq!(cli.user, "alice");
    match cli.command {
        Commands::Budgets {
            action:
                BudgetsAction::Set {
                    category,
                    month,
                    limit,
                    items,
                },
        } => {
            assert_eq!(category, 3);
            assert_eq!(month, march());
            assert_eq!(limit, -10.0);
            assert_eq!(items.len(), 2);
        }
        _ => panic!("expected budgets set"),
    }
}

#[test]
fn test_cli_rejects_bad_month() {
    assert!(Cli::try_parse_from(["tally", "report", "--month", "2025-3"]).is_err());
    assert!(Cli::try_parse_from(["tally", "report", "--month", "2025-13"]).is_err());
}

#[test]
fn test_cli_defaults() {
    let cli = Cli::try_parse_from(["tally", "init"]).unwrap();
    assert_eq!(cli.user, "local-dev");
    assert_eq!(cli.db.to_str(), Some("tally.db"));
    assert!(!cli.verbose);
}

// ========== Utility Tests ==========

#[test]
fn test_truncate() {
    assert_eq!(truncate("short", 10), "short");
    assert_eq!(truncate("a longer category name", 10), "a longe...");
    assert_eq!(truncate("Café crème", 6), "Caf...");
}
