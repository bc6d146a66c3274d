//! Budget operations
//!
//! A budget is one row in `budgets` plus its ordered rows in `budget_items`.
//! Each item stores `name_key` (see [`crate::ledger::item_key`]) so the
//! ledger can match expenses to items with an indexed equality lookup.

use std::collections::HashMap;

use rusqlite::{params, OptionalExtension, Row};
use tracing::{debug, warn};

use super::categories::{optional_category_from_row, CATEGORY_COLUMNS};
use super::{parse_datetime, Database, DbConn};
use crate::error::{Error, Result};
use crate::ledger::item_key;
use crate::models::{Budget, BudgetItem, BudgetItemType, BudgetWithCategory};
use crate::month::Month;

const BUDGET_COLUMNS: &str =
    "b.id, b.user_id, b.category_id, b.month, b.limit_amount, b.created_at, b.updated_at";

/// Build a budget (without items) from the seven `BUDGET_COLUMNS`
fn budget_from_row(row: &Row) -> rusqlite::Result<Budget> {
    let month_str: String = row.get(3)?;
    let created_at_str: String = row.get(5)?;
    let updated_at_str: String = row.get(6)?;

    let month = month_str.parse::<Month>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(Budget {
        id: row.get(0)?,
        user: row.get(1)?,
        category_id: row.get(2)?,
        month,
        limit: row.get(4)?,
        items: vec![],
        created_at: parse_datetime(&created_at_str),
        updated_at: parse_datetime(&updated_at_str),
    })
}

/// Load items for a set of budgets, keyed by budget id, in position order
fn load_items(conn: &DbConn, budget_ids: &[i64]) -> Result<HashMap<i64, Vec<BudgetItem>>> {
    let mut items: HashMap<i64, Vec<BudgetItem>> = HashMap::new();
    if budget_ids.is_empty() {
        return Ok(items);
    }

    let placeholders = vec!["?"; budget_ids.len()].join(", ");
    let mut stmt = conn.prepare(&format!(
        "SELECT budget_id, name, allocated, spent, item_type FROM budget_items WHERE budget_id IN ({}) ORDER BY budget_id, position",
        placeholders
    ))?;

    let rows = stmt.query_map(rusqlite::params_from_iter(budget_ids.iter()), |row| {
        let type_str: String = row.get(4)?;
        Ok((
            row.get::<_, i64>(0)?,
            BudgetItem {
                name: row.get(1)?,
                allocated: row.get(2)?,
                spent: row.get(3)?,
                item_type: type_str.parse::<BudgetItemType>().unwrap_or_default(),
            },
        ))
    })?;

    for row in rows {
        let (budget_id, item) = row?;
        items.entry(budget_id).or_default().push(item);
    }

    Ok(items)
}

fn insert_items(conn: &DbConn, budget_id: i64, items: &[BudgetItem]) -> Result<()> {
    let mut stmt = conn.prepare(
        "INSERT INTO budget_items (budget_id, position, name, name_key, allocated, spent, item_type) VALUES (?, ?, ?, ?, ?, ?, ?)",
    )?;
    for (position, item) in items.iter().enumerate() {
        stmt.execute(params![
            budget_id,
            position as i64,
            item.name,
            item_key(&item.name),
            item.allocated,
            item.spent,
            item.item_type.as_str(),
        ])?;
    }
    Ok(())
}

impl Database {
    /// Create or update the budget for (user, category, month)
    ///
    /// An existing budget gets the new limit. When `items` is `Some`, the item
    /// list is replaced wholesale (items not in the new list are dropped along
    /// with their `spent` counters); `None` leaves existing items untouched.
    pub fn upsert_budget(
        &self,
        user: &str,
        category_id: i64,
        month: Month,
        limit: f64,
        items: Option<&[BudgetItem]>,
    ) -> Result<Budget> {
        if let Some(items) = items {
            if let Some(pos) = items.iter().position(|i| i.name.trim().is_empty()) {
                return Err(Error::InvalidData(format!(
                    "Budget item {} is missing a name",
                    pos + 1
                )));
            }
        }

        if limit < 0.0 {
            warn!(user, category_id, month = %month, limit, "Negative budget limit stored");
        }

        let conn = self.conn()?;

        // IMMEDIATE takes the write lock up front so two upserts for the same
        // key serialize instead of interleaving their item lists
        conn.execute_batch("BEGIN IMMEDIATE")?;

        let result = (|| -> Result<i64> {
            let budget_id: i64 = conn.query_row(
                r#"
                INSERT INTO budgets (user_id, category_id, month, limit_amount)
                VALUES (?1, ?2, ?3, ?4)
                ON CONFLICT(user_id, category_id, month) DO UPDATE SET
                    limit_amount = excluded.limit_amount,
                    updated_at = CURRENT_TIMESTAMP
                RETURNING id
                "#,
                params![user, category_id, month.to_string(), limit],
                |row| row.get(0),
            )?;

            if let Some(items) = items {
                conn.execute(
                    "DELETE FROM budget_items WHERE budget_id = ?",
                    params![budget_id],
                )?;
                insert_items(&conn, budget_id, items)?;
            }

            Ok(budget_id)
        })();

        let budget_id = match result {
            Ok(id) => {
                conn.execute_batch("COMMIT")?;
                id
            }
            Err(e) => {
                let _ = conn.execute_batch("ROLLBACK");
                return Err(e);
            }
        };
        drop(conn);

        debug!(
            user,
            category_id,
            month = %month,
            limit,
            replaced_items = items.is_some(),
            "Budget upserted"
        );

        self.get_budget_by_id(user, budget_id)?
            .ok_or_else(|| Error::NotFound(format!("budget {}", budget_id)))
    }

    /// Get a budget by id (scoped to the user)
    pub fn get_budget_by_id(&self, user: &str, id: i64) -> Result<Option<Budget>> {
        let conn = self.conn()?;
        let budget = conn
            .query_row(
                &format!(
                    "SELECT {} FROM budgets b WHERE b.id = ? AND b.user_id = ?",
                    BUDGET_COLUMNS
                ),
                params![id, user],
                budget_from_row,
            )
            .optional()?;

        let Some(mut budget) = budget else {
            return Ok(None);
        };
        budget.items = load_items(&conn, &[budget.id])?
            .remove(&budget.id)
            .unwrap_or_default();
        Ok(Some(budget))
    }

    /// Get the budget for (user, category, month), if one has been set
    pub fn get_budget(&self, user: &str, category_id: i64, month: Month) -> Result<Option<Budget>> {
        let conn = self.conn()?;
        let budget = conn
            .query_row(
                &format!(
                    "SELECT {} FROM budgets b WHERE b.user_id = ? AND b.category_id = ? AND b.month = ?",
                    BUDGET_COLUMNS
                ),
                params![user, category_id, month.to_string()],
                budget_from_row,
            )
            .optional()?;

        let Some(mut budget) = budget else {
            return Ok(None);
        };
        budget.items = load_items(&conn, &[budget.id])?
            .remove(&budget.id)
            .unwrap_or_default();
        Ok(Some(budget))
    }

    /// List a user's budgets for a month with their categories resolved
    pub fn list_budgets_for_month(
        &self,
        user: &str,
        month: Month,
    ) -> Result<Vec<BudgetWithCategory>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            r#"
            SELECT {}, {}
            FROM budgets b
            LEFT JOIN categories c ON c.id = b.category_id AND c.user_id = b.user_id
            WHERE b.user_id = ? AND b.month = ?
            ORDER BY c.name COLLATE NOCASE, b.id
            "#,
            BUDGET_COLUMNS, CATEGORY_COLUMNS
        ))?;

        let mut budgets = stmt
            .query_map(params![user, month.to_string()], |row| {
                Ok(BudgetWithCategory {
                    budget: budget_from_row(row)?,
                    category: optional_category_from_row(row, 7)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let ids: Vec<i64> = budgets.iter().map(|b| b.budget.id).collect();
        let mut items = load_items(&conn, &ids)?;
        for entry in &mut budgets {
            entry.budget.items = items.remove(&entry.budget.id).unwrap_or_default();
        }

        Ok(budgets)
    }

    /// Budget limits for a month keyed by category id
    pub fn budget_limits_for_month(&self, user: &str, month: Month) -> Result<HashMap<i64, f64>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT category_id, limit_amount FROM budgets WHERE user_id = ? AND month = ?",
        )?;

        let limits = stmt
            .query_map(params![user, month.to_string()], |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, f64>(1)?))
            })?
            .collect::<std::result::Result<HashMap<_, _>, _>>()?;

        Ok(limits)
    }

    /// Add `amount` to the first item of a budget whose normalized name matches `key`
    ///
    /// The read-modify-write happens inside one UPDATE statement, so concurrent
    /// increments of the same item can't overwrite each other. Returns whether
    /// an item matched.
    pub fn increment_item_spent(&self, budget_id: i64, key: &str, amount: f64) -> Result<bool> {
        let conn = self.conn()?;
        let changed = conn.execute(
            r#"
            UPDATE budget_items SET spent = spent + ?1
            WHERE id = (
                SELECT id FROM budget_items
                WHERE budget_id = ?2 AND name_key = ?3
                ORDER BY position
                LIMIT 1
            )
            "#,
            params![amount, budget_id, key],
        )?;

        if changed > 0 {
            conn.execute(
                "UPDATE budgets SET updated_at = CURRENT_TIMESTAMP WHERE id = ?",
                params![budget_id],
            )?;
        }
        Ok(changed > 0)
    }

    /// Overwrite item `spent` counters by position
    pub(crate) fn set_item_spent(&self, budget_id: i64, spent_by_position: &[f64]) -> Result<()> {
        let conn = self.conn()?;
        conn.execute_batch("BEGIN IMMEDIATE")?;

        let result = (|| -> Result<()> {
            let mut stmt = conn.prepare(
                "UPDATE budget_items SET spent = ? WHERE budget_id = ? AND position = ?",
            )?;
            for (position, spent) in spent_by_position.iter().enumerate() {
                stmt.execute(params![spent, budget_id, position as i64])?;
            }
            conn.execute(
                "UPDATE budgets SET updated_at = CURRENT_TIMESTAMP WHERE id = ?",
                params![budget_id],
            )?;
            Ok(())
        })();

        match result {
            Ok(()) => {
                conn.execute_batch("COMMIT")?;
                Ok(())
            }
            Err(e) => {
                let _ = conn.execute_batch("ROLLBACK");
                Err(e)
            }
        }
    }
}
