//! Category operations

use rusqlite::{params, OptionalExtension, Row};

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{Category, CategoryUpdate, NewCategory, DEFAULT_CATEGORY_COLOR};

/// Columns selected by `category_from_row`, in order
pub(super) const CATEGORY_COLUMNS: &str = "c.id, c.user_id, c.name, c.color, c.created_at";

/// Build a category from five consecutive columns starting at `offset`
pub(super) fn category_from_row(row: &Row, offset: usize) -> rusqlite::Result<Category> {
    let created_at_str: String = row.get(offset + 4)?;
    Ok(Category {
        id: row.get(offset)?,
        user: row.get(offset + 1)?,
        name: row.get(offset + 2)?,
        color: row.get(offset + 3)?,
        created_at: parse_datetime(&created_at_str),
    })
}

/// Like `category_from_row`, but `None` when a LEFT JOIN found no category
pub(super) fn optional_category_from_row(
    row: &Row,
    offset: usize,
) -> rusqlite::Result<Option<Category>> {
    let id: Option<i64> = row.get(offset)?;
    match id {
        Some(_) => category_from_row(row, offset).map(Some),
        None => Ok(None),
    }
}

fn clean_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::InvalidData("Category name is required".to_string()));
    }
    Ok(name.to_string())
}

impl Database {
    /// Create a category owned by `user`
    pub fn create_category(&self, user: &str, new: &NewCategory) -> Result<Category> {
        let name = clean_name(&new.name)?;
        let color = new
            .color
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_CATEGORY_COLOR);

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO categories (user_id, name, color) VALUES (?, ?, ?)",
            params![user, name, color],
        )?;
        let id = conn.last_insert_rowid();
        drop(conn);

        self.get_category(user, id)?
            .ok_or_else(|| Error::NotFound(format!("category {}", id)))
    }

    /// List a user's categories by name
    pub fn list_categories(&self, user: &str) -> Result<Vec<Category>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM categories c WHERE c.user_id = ? ORDER BY c.name COLLATE NOCASE, c.id",
            CATEGORY_COLUMNS
        ))?;

        let categories = stmt
            .query_map(params![user], |row| category_from_row(row, 0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(categories)
    }

    /// Get one of the user's categories
    pub fn get_category(&self, user: &str, id: i64) -> Result<Option<Category>> {
        let conn = self.conn()?;
        let category = conn
            .query_row(
                &format!(
                    "SELECT {} FROM categories c WHERE c.id = ? AND c.user_id = ?",
                    CATEGORY_COLUMNS
                ),
                params![id, user],
                |row| category_from_row(row, 0),
            )
            .optional()?;

        Ok(category)
    }

    /// Apply a partial update; returns `None` if the user has no such category
    pub fn update_category(
        &self,
        user: &str,
        id: i64,
        update: &CategoryUpdate,
    ) -> Result<Option<Category>> {
        let name = update.name.as_deref().map(clean_name).transpose()?;
        let color = update
            .color
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty());

        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE categories SET name = COALESCE(?, name), color = COALESCE(?, color) WHERE id = ? AND user_id = ?",
            params![name, color, id, user],
        )?;
        drop(conn);

        if changed == 0 {
            return Ok(None);
        }
        self.get_category(user, id)
    }

    /// Delete a category. Budgets and expenses referencing it are kept.
    ///
    /// Returns false if the user has no such category.
    pub fn delete_category(&self, user: &str, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM categories WHERE id = ? AND user_id = ?",
            params![id, user],
        )?;
        Ok(deleted > 0)
    }
}
