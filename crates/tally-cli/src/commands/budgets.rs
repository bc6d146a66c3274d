//! Budget command implementations

use anyhow::{Context, Result};
use tally_core::db::Database;
use tally_core::models::{BudgetItem, BudgetItemType, UNKNOWN_CATEGORY_LABEL};
use tally_core::{Ledger, Month};

use super::truncate;

/// Parse a `name:allocated[:type]` sub-item argument
pub fn parse_budget_item(arg: &str) -> Result<BudgetItem> {
    let mut parts = arg.splitn(3, ':');
    let name = parts.next().unwrap_or_default().trim();
    let allocated = parts
        .next()
        .with_context(|| format!("Invalid item '{}' (use name:allocated[:type])", arg))?;
    let allocated: f64 = allocated
        .trim()
        .parse()
        .with_context(|| format!("Invalid allocated amount in item '{}'", arg))?;
    let item_type = match parts.next() {
        Some(t) => t
            .parse::<BudgetItemType>()
            .map_err(|e| anyhow::anyhow!(e))?,
        None => BudgetItemType::default(),
    };

    if name.is_empty() {
        anyhow::bail!("Item '{}' is missing a name", arg);
    }

    Ok(BudgetItem::new(name, allocated, item_type))
}

pub fn cmd_budgets_list(db: &Database, user: &str, month: Month) -> Result<()> {
    let budgets = db.list_budgets_for_month(user, month)?;

    if budgets.is_empty() {
        println!("No budgets for {}.", month);
        return Ok(());
    }

    println!();
    println!("💰 Budgets for {}", month);
    println!("   ─────────────────────────────────────────────────────");

    for entry in &budgets {
        let name = entry
            .category
            .as_ref()
            .map(|c| c.name.as_str())
            .unwrap_or(UNKNOWN_CATEGORY_LABEL);
        println!(
            "   {:<28} limit ${:>10.2}",
            truncate(name, 28),
            entry.budget.limit
        );
        for item in &entry.budget.items {
            println!(
                "      • {:<22} ${:>8.2} of ${:>8.2} ({})",
                truncate(&item.name, 22),
                item.spent,
                item.allocated,
                item.item_type
            );
        }
    }

    Ok(())
}

pub fn cmd_budgets_set(
    db: &Database,
    user: &str,
    category: i64,
    month: Month,
    limit: f64,
    items: &[String],
) -> Result<()> {
    // No --item flags leaves existing items alone
    let items = if items.is_empty() {
        None
    } else {
        Some(
            items
                .iter()
                .map(|s| parse_budget_item(s))
                .collect::<Result<Vec<_>>>()?,
        )
    };

    let budget = db.upsert_budget(user, category, month, limit, items.as_deref())?;

    println!(
        "✅ Budget for category {} in {} set to ${:.2} ({} item{})",
        category,
        month,
        budget.limit,
        budget.items.len(),
        if budget.items.len() == 1 { "" } else { "s" }
    );

    Ok(())
}

pub fn cmd_budgets_reconcile(db: &Database, user: &str, category: i64, month: Month) -> Result<()> {
    let budget = Ledger::new(db)
        .reconcile_budget(user, category, month)
        .context("Failed to reconcile budget")?;

    println!("🔄 Reconciled budget for category {} in {}", category, month);
    for item in &budget.items {
        println!("   • {:<22} ${:>8.2}", truncate(&item.name, 22), item.spent);
    }

    Ok(())
}
