//! Domain models for Tally
//!
//! Models serialize with camelCase field names, which is what the browser
//! client reads and writes.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::month::Month;

/// Color assigned to categories created without one
pub const DEFAULT_CATEGORY_COLOR: &str = "#3B82F6";

/// Label reported for an expense whose category can't be resolved
pub const UNKNOWN_CATEGORY_LABEL: &str = "Selected Category";

/// A user-defined spending category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    /// Owning user
    pub user: String,
    pub name: String,
    pub color: String,
    pub created_at: DateTime<Utc>,
}

/// Fields for creating a category
#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub color: Option<String>,
}

/// Partial category update; `None` leaves the field unchanged
#[derive(Debug, Clone, Default)]
pub struct CategoryUpdate {
    pub name: Option<String>,
    pub color: Option<String>,
}

/// Kind of budget sub-item
///
/// Deserializes through [`FromStr`](std::str::FromStr) so JSON bodies accept
/// the same aliases as the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(try_from = "String")]
pub enum BudgetItemType {
    /// Repeats throughout the month (e.g. a daily coffee)
    #[default]
    #[serde(rename = "recurring")]
    Recurring,
    /// A single planned purchase
    #[serde(rename = "one-off")]
    OneOff,
}

impl BudgetItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Recurring => "recurring",
            Self::OneOff => "one-off",
        }
    }
}

impl std::str::FromStr for BudgetItemType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "recurring" | "daily" => Ok(Self::Recurring),
            "one-off" | "oneoff" | "one_off" | "custom" => Ok(Self::OneOff),
            _ => Err(format!("Unknown budget item type: {}", s)),
        }
    }
}

impl TryFrom<String> for BudgetItemType {
    type Error = String;

    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        s.parse()
    }
}

impl std::fmt::Display for BudgetItemType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A named allocation inside a budget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetItem {
    pub name: String,
    #[serde(default)]
    pub allocated: f64,
    /// Running total of matching expenses, maintained by the ledger
    #[serde(default)]
    pub spent: f64,
    #[serde(rename = "type", default)]
    pub item_type: BudgetItemType,
}

impl BudgetItem {
    pub fn new(name: impl Into<String>, allocated: f64, item_type: BudgetItemType) -> Self {
        Self {
            name: name.into(),
            allocated,
            spent: 0.0,
            item_type,
        }
    }
}

/// Spending limit and sub-item plan for one category in one month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    pub id: i64,
    pub user: String,
    pub category_id: i64,
    pub month: Month,
    pub limit: f64,
    pub items: Vec<BudgetItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Budget with its category resolved (`None` when the category was deleted)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetWithCategory {
    #[serde(flatten)]
    pub budget: Budget,
    pub category: Option<Category>,
}

/// A logged expense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: i64,
    pub user: String,
    pub category_id: i64,
    pub amount: f64,
    pub date: NaiveDate,
    pub sub_item_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields for recording an expense
#[derive(Debug, Clone)]
pub struct NewExpense {
    pub category_id: i64,
    pub amount: f64,
    pub date: NaiveDate,
    pub sub_item_name: Option<String>,
}

/// Expense with its category resolved (`None` when the category was deleted)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseWithCategory {
    #[serde(flatten)]
    pub expense: Expense,
    pub category: Option<Category>,
}

/// Result of recording an expense
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseOutcome {
    pub expense: Expense,
    /// True only when a positive limit exists and the month's spend exceeds it
    pub over: bool,
    /// Category total for the expense's month
    pub spent: f64,
    /// Budget limit used for the check (0 when no budget exists)
    pub limit: f64,
    pub category_name: String,
}

/// One row of the monthly budget report
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    pub category: Category,
    pub budget: f64,
    pub spent: f64,
    pub remaining: f64,
}

/// Category whose spending jumped well above its trailing average
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Anomaly {
    pub category_id: i64,
    pub category: String,
    pub color: String,
    pub percentage_increase: i64,
}

/// Suggested limit derived from the trailing average
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub category_id: i64,
    pub category: String,
    pub color: String,
    pub average_spending: f64,
    pub suggested_budget: f64,
}

/// Trend, anomaly and recommendation summary for a month
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Insights {
    pub month: Month,
    pub current_month_total: f64,
    pub last_month_total: f64,
    pub anomalies: Vec<Anomaly>,
    pub recommendations: Vec<Recommendation>,
}

/// Audit log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub id: i64,
    pub timestamp: String,
    pub user: String,
    pub action: String,
    pub entity_type: Option<String>,
    pub entity_id: Option<i64>,
    pub details: Option<String>,
}
