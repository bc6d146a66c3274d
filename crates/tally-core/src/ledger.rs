//! Expense ingestion and budget reconciliation
//!
//! Recording an expense appends it to the ledger, bumps the `spent` counter
//! of the matching budget sub-item (if any), and re-sums the category's spend
//! for the month to decide whether the budget is exceeded.
//!
//! Sub-items are matched on [`item_key`]: the name trimmed and lowercased.

use tracing::{debug, info, warn};

use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::{Budget, ExpenseOutcome, NewExpense, UNKNOWN_CATEGORY_LABEL};
use crate::month::Month;

/// Normalized key used to match expense sub-item names to budget items
pub fn item_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Whether spend exceeds a budget limit
///
/// A limit of zero or less means no budget was set, never a zero allowance.
pub fn is_over_budget(limit: f64, spent: f64) -> bool {
    limit > 0.0 && spent > limit
}

/// Reconciliation routine over a database
pub struct Ledger<'a> {
    db: &'a Database,
}

impl<'a> Ledger<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Record an expense and reconcile it against the month's budget
    pub fn record_expense(&self, user: &str, new: &NewExpense) -> Result<ExpenseOutcome> {
        let month = Month::of(new.date);

        let expense = self.db.insert_expense(user, new)?;
        let budget = self.db.get_budget(user, new.category_id, month)?;

        // The expense is already committed; a failed counter update is left
        // for `reconcile_budget` to repair instead of failing the write
        if let (Some(name), Some(budget)) = (expense.sub_item_name.as_deref(), budget.as_ref()) {
            match self
                .db
                .increment_item_spent(budget.id, &item_key(name), expense.amount)
            {
                Ok(true) => debug!(
                    budget_id = budget.id,
                    item = name,
                    amount = expense.amount,
                    "Sub-item spend updated"
                ),
                Ok(false) => debug!(
                    budget_id = budget.id,
                    item = name,
                    "No budget item matches expense sub-item"
                ),
                Err(e) => warn!(
                    budget_id = budget.id,
                    item = name,
                    error = %e,
                    "Sub-item spend update failed; reconcile the budget to repair"
                ),
            }
        }

        let spent = self
            .db
            .category_month_total(user, new.category_id, month)?;
        let limit = budget.as_ref().map(|b| b.limit).unwrap_or(0.0);
        let over = is_over_budget(limit, spent);

        if over {
            info!(
                user,
                category_id = new.category_id,
                month = %month,
                spent,
                limit,
                "Category is over budget"
            );
        }

        Ok(ExpenseOutcome {
            expense,
            over,
            spent,
            limit,
            category_name: self.category_name(user, new.category_id),
        })
    }

    /// Display name for a category, degrading to a placeholder on any failure
    fn category_name(&self, user: &str, category_id: i64) -> String {
        match self.db.get_category(user, category_id) {
            Ok(Some(category)) => category.name,
            Ok(None) => UNKNOWN_CATEGORY_LABEL.to_string(),
            Err(e) => {
                warn!(category_id, error = %e, "Category lookup failed");
                UNKNOWN_CATEGORY_LABEL.to_string()
            }
        }
    }

    /// Recompute every sub-item's `spent` of a budget from the ledger
    ///
    /// Each expense counts toward the first item whose key matches, the same
    /// rule `record_expense` applies incrementally.
    pub fn reconcile_budget(&self, user: &str, category_id: i64, month: Month) -> Result<Budget> {
        let budget = self
            .db
            .get_budget(user, category_id, month)?
            .ok_or_else(|| {
                Error::NotFound(format!("budget for category {} in {}", category_id, month))
            })?;

        let keys: Vec<String> = budget.items.iter().map(|i| item_key(&i.name)).collect();
        let mut spent = vec![0.0; keys.len()];

        for (name, amount) in self.db.tagged_expenses(user, category_id, month)? {
            let key = item_key(&name);
            if let Some(pos) = keys.iter().position(|k| *k == key) {
                spent[pos] += amount;
            }
        }

        self.db.set_item_spent(budget.id, &spent)?;
        info!(budget_id = budget.id, items = keys.len(), "Budget items reconciled");

        self.db
            .get_budget_by_id(user, budget.id)?
            .ok_or_else(|| Error::NotFound(format!("budget {}", budget.id)))
    }
}
