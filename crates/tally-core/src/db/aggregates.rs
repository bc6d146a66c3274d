//! Monthly spending sums
//!
//! All windows are inclusive `[first_day, last_day]` over the stored
//! `YYYY-MM-DD` dates, which compare correctly as text.

use std::collections::HashMap;

use rusqlite::params;

use super::categories::{category_from_row, CATEGORY_COLUMNS};
use super::Database;
use crate::error::Result;
use crate::models::Category;
use crate::month::Month;

/// Per-category spending used by the insights engine
#[derive(Debug, Clone)]
pub struct CategoryActivity {
    pub category: Category,
    /// Spend inside the reference month
    pub current_month_spending: f64,
    /// Spend across the trailing months strictly before the reference month
    pub trailing_total: f64,
}

impl Database {
    /// Total spend for one category in a month
    pub fn category_month_total(&self, user: &str, category_id: i64, month: Month) -> Result<f64> {
        let (from, to) = month.date_range();
        let conn = self.conn()?;
        let total: f64 = conn.query_row(
            r#"
            SELECT COALESCE(SUM(amount), 0) FROM expenses
            WHERE user_id = ? AND category_id = ? AND date >= ? AND date <= ?
            "#,
            params![user, category_id, from, to],
            |row| row.get(0),
        )?;
        Ok(total)
    }

    /// Total spend across all categories in a month
    ///
    /// Includes expenses whose category has since been deleted.
    pub fn month_total(&self, user: &str, month: Month) -> Result<f64> {
        let (from, to) = month.date_range();
        let conn = self.conn()?;
        let total: f64 = conn.query_row(
            "SELECT COALESCE(SUM(amount), 0) FROM expenses WHERE user_id = ? AND date >= ? AND date <= ?",
            params![user, from, to],
            |row| row.get(0),
        )?;
        Ok(total)
    }

    /// Spend per category id in a month
    pub fn spending_by_category(&self, user: &str, month: Month) -> Result<HashMap<i64, f64>> {
        let (from, to) = month.date_range();
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT category_id, SUM(amount) FROM expenses
            WHERE user_id = ? AND date >= ? AND date <= ?
            GROUP BY category_id
            "#,
        )?;

        let totals = stmt
            .query_map(params![user, from, to], |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, f64>(1)?))
            })?
            .collect::<std::result::Result<HashMap<_, _>, _>>()?;

        Ok(totals)
    }

    /// Current-month and trailing spend for each existing category with any
    /// expenses in `[month - trailing_months, month]`
    ///
    /// Expenses of deleted categories are dropped by the inner join.
    pub fn category_activity(
        &self,
        user: &str,
        month: Month,
        trailing_months: u32,
    ) -> Result<Vec<CategoryActivity>> {
        let (window_start, _) = month.offset(-(trailing_months as i32)).date_range();
        let (month_start, month_end) = month.date_range();

        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            r#"
            SELECT {},
                COALESCE(SUM(CASE WHEN e.date >= ?2 THEN e.amount ELSE 0 END), 0) AS current_spending,
                COALESCE(SUM(CASE WHEN e.date < ?2 THEN e.amount ELSE 0 END), 0) AS trailing_spending
            FROM expenses e
            JOIN categories c ON c.id = e.category_id AND c.user_id = e.user_id
            WHERE e.user_id = ?1 AND e.date >= ?3 AND e.date <= ?4
            GROUP BY c.id
            ORDER BY c.name COLLATE NOCASE, c.id
            "#,
            CATEGORY_COLUMNS
        ))?;

        let activity = stmt
            .query_map(params![user, month_start, window_start, month_end], |row| {
                Ok(CategoryActivity {
                    category: category_from_row(row, 0)?,
                    current_month_spending: row.get(5)?,
                    trailing_total: row.get(6)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(activity)
    }
}
