//! Expense ledger operations

use chrono::Datelike;
use rusqlite::{params, OptionalExtension, Row};

use super::categories::{optional_category_from_row, CATEGORY_COLUMNS};
use super::{parse_date, parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{Expense, ExpenseWithCategory, NewExpense};
use crate::month::Month;

const EXPENSE_COLUMNS: &str =
    "e.id, e.user_id, e.category_id, e.amount, e.date, e.sub_item_name, e.created_at";

fn expense_from_row(row: &Row) -> rusqlite::Result<Expense> {
    let date_str: String = row.get(4)?;
    let created_at_str: String = row.get(6)?;
    Ok(Expense {
        id: row.get(0)?,
        user: row.get(1)?,
        category_id: row.get(2)?,
        amount: row.get(3)?,
        date: parse_date(&date_str, 4)?,
        sub_item_name: row.get(5)?,
        created_at: parse_datetime(&created_at_str),
    })
}

impl Database {
    /// Append an expense to the ledger
    ///
    /// Only the row is written here; budget reconciliation lives in
    /// [`crate::ledger::Ledger::record_expense`].
    pub fn insert_expense(&self, user: &str, new: &NewExpense) -> Result<Expense> {
        if !new.amount.is_finite() || new.amount <= 0.0 {
            return Err(Error::InvalidData(format!(
                "Expense amount must be a positive number, got {}",
                new.amount
            )));
        }
        // Stored dates must fall inside a representable month
        Month::new(new.date.year(), new.date.month())?;

        let sub_item_name = new
            .sub_item_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO expenses (user_id, category_id, amount, date, sub_item_name) VALUES (?, ?, ?, ?, ?)",
            params![
                user,
                new.category_id,
                new.amount,
                new.date.format("%Y-%m-%d").to_string(),
                sub_item_name
            ],
        )?;
        let id = conn.last_insert_rowid();
        drop(conn);

        self.get_expense(user, id)?
            .ok_or_else(|| Error::NotFound(format!("expense {}", id)))
    }

    /// Get one of the user's expenses
    pub fn get_expense(&self, user: &str, id: i64) -> Result<Option<Expense>> {
        let conn = self.conn()?;
        let expense = conn
            .query_row(
                &format!(
                    "SELECT {} FROM expenses e WHERE e.id = ? AND e.user_id = ?",
                    EXPENSE_COLUMNS
                ),
                params![id, user],
                expense_from_row,
            )
            .optional()?;
        Ok(expense)
    }

    /// List a user's expenses in a month, oldest first, with categories resolved
    pub fn list_expenses_for_month(
        &self,
        user: &str,
        month: Month,
    ) -> Result<Vec<ExpenseWithCategory>> {
        let (from, to) = month.date_range();
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            r#"
            SELECT {}, {}
            FROM expenses e
            LEFT JOIN categories c ON c.id = e.category_id AND c.user_id = e.user_id
            WHERE e.user_id = ? AND e.date >= ? AND e.date <= ?
            ORDER BY e.date, e.id
            "#,
            EXPENSE_COLUMNS, CATEGORY_COLUMNS
        ))?;

        let expenses = stmt
            .query_map(params![user, from, to], |row| {
                Ok(ExpenseWithCategory {
                    expense: expense_from_row(row)?,
                    category: optional_category_from_row(row, 7)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(expenses)
    }

    /// Sub-item names and amounts of a category's expenses in a month
    pub(crate) fn tagged_expenses(
        &self,
        user: &str,
        category_id: i64,
        month: Month,
    ) -> Result<Vec<(String, f64)>> {
        let (from, to) = month.date_range();
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT sub_item_name, amount FROM expenses
            WHERE user_id = ? AND category_id = ? AND date >= ? AND date <= ?
              AND sub_item_name IS NOT NULL
            ORDER BY date, id
            "#,
        )?;

        let rows = stmt
            .query_map(params![user, category_id, from, to], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rows)
    }
}
