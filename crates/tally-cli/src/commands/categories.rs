//! Category command implementations

use anyhow::Result;
use tally_core::db::Database;
use tally_core::models::NewCategory;

use super::truncate;

pub fn cmd_categories_list(db: &Database, user: &str) -> Result<()> {
    let categories = db.list_categories(user)?;

    if categories.is_empty() {
        println!("No categories yet. Add one with 'tally categories add <name>'.");
        return Ok(());
    }

    println!();
    println!("🏷️  Categories");
    println!("   ─────────────────────────────────────────");

    for category in &categories {
        println!(
            "   {:>4}  {:<28} {}",
            category.id,
            truncate(&category.name, 28),
            category.color
        );
    }

    Ok(())
}

pub fn cmd_categories_add(
    db: &Database,
    user: &str,
    name: &str,
    color: Option<&str>,
) -> Result<()> {
    let category = db.create_category(
        user,
        &NewCategory {
            name: name.to_string(),
            color: color.map(str::to_string),
        },
    )?;
    println!(
        "✅ Created category '{}' (id: {})",
        category.name, category.id
    );

    Ok(())
}

pub fn cmd_categories_delete(db: &Database, user: &str, id: i64) -> Result<()> {
    if !db.delete_category(user, id)? {
        anyhow::bail!("Category not found: {}", id);
    }
    println!("🗑️  Deleted category {}", id);
    println!("   Budgets and expenses that used it are kept");

    Ok(())
}
