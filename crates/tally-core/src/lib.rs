//! Tally Core Library
//!
//! Shared functionality for the Tally budgeting service:
//! - Database access and migrations (categories, budgets, expenses, audit log)
//! - Expense ingestion and budget reconciliation
//! - Monthly budget-vs-actual reports
//! - Spending anomaly detection and budget recommendations

pub mod db;
pub mod error;
pub mod insights;
pub mod ledger;
pub mod models;
pub mod month;
pub mod report;

pub use db::{CategoryActivity, Database};
pub use error::{Error, Result};
pub use ledger::Ledger;
pub use models::*;
pub use month::{parse_expense_date, Month};
