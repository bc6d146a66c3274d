//! Expense command implementations

use anyhow::Result;
use chrono::Utc;
use tally_core::db::Database;
use tally_core::models::{NewExpense, UNKNOWN_CATEGORY_LABEL};
use tally_core::{parse_expense_date, Ledger, Month};

use super::truncate;

pub fn cmd_expenses_list(db: &Database, user: &str, month: Month) -> Result<()> {
    let expenses = db.list_expenses_for_month(user, month)?;

    if expenses.is_empty() {
        println!("No expenses for {}.", month);
        return Ok(());
    }

    println!();
    println!("🧾 Expenses for {}", month);
    println!("   ─────────────────────────────────────────────────────────────");

    let mut total = 0.0;
    for entry in &expenses {
        let category = entry
            .category
            .as_ref()
            .map(|c| c.name.as_str())
            .unwrap_or(UNKNOWN_CATEGORY_LABEL);
        let item = entry.expense.sub_item_name.as_deref().unwrap_or("");
        println!(
            "   {}  {:<20} {:<18} ${:>10.2}",
            entry.expense.date,
            truncate(category, 20),
            truncate(item, 18),
            entry.expense.amount
        );
        total += entry.expense.amount;
    }

    println!("   ─────────────────────────────────────────────────────────────");
    println!("   {:<51} ${:>10.2}", "Total", total);

    Ok(())
}

pub fn cmd_expenses_add(
    db: &Database,
    user: &str,
    category: i64,
    amount: f64,
    date: Option<&str>,
    item: Option<&str>,
) -> Result<()> {
    let date = match date {
        Some(d) => parse_expense_date(d)?,
        None => Utc::now().date_naive(),
    };

    let outcome = Ledger::new(db).record_expense(
        user,
        &NewExpense {
            category_id: category,
            amount,
            date,
            sub_item_name: item.map(str::to_string),
        },
    )?;

    println!(
        "✅ Logged ${:.2} to {} on {}",
        outcome.expense.amount, outcome.category_name, outcome.expense.date
    );
    if outcome.limit > 0.0 {
        println!(
            "   Spent ${:.2} of ${:.2} this month",
            outcome.spent, outcome.limit
        );
    } else {
        println!("   Spent ${:.2} this month (no budget set)", outcome.spent);
    }
    if outcome.over {
        println!("   ⚠️  Over budget by ${:.2}", outcome.spent - outcome.limit);
    }

    Ok(())
}
