//! Report command implementations

use anyhow::Result;
use tally_core::db::Database;
use tally_core::insights::analyze;
use tally_core::report::monthly_report;
use tally_core::Month;

use super::truncate;

pub fn cmd_report(db: &Database, user: &str, month: Month, json: bool) -> Result<()> {
    let rows = monthly_report(db, user, month)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if rows.is_empty() {
        println!("No budgets or spending for {}.", month);
        return Ok(());
    }

    println!();
    println!("📊 Budget report for {}", month);
    println!("   ───────────────────────────────────────────────────────────────");
    println!(
        "   {:<24} {:>12} {:>12} {:>12}",
        "Category", "Budget", "Spent", "Remaining"
    );

    for row in &rows {
        let flag = if row.budget > 0.0 && row.spent > row.budget {
            " ⚠️"
        } else {
            ""
        };
        println!(
            "   {:<24} {:>12.2} {:>12.2} {:>12.2}{}",
            truncate(&row.category.name, 24),
            row.budget,
            row.spent,
            row.remaining,
            flag
        );
    }

    Ok(())
}

pub fn cmd_insights(db: &Database, user: &str, month: Option<Month>, json: bool) -> Result<()> {
    let month = month.unwrap_or_else(Month::current);
    let insights = analyze(db, user, month)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&insights)?);
        return Ok(());
    }

    println!();
    println!("💡 Insights for {}", month);
    println!("   ─────────────────────────────────────────");
    println!("   This month: ${:.2}", insights.current_month_total);
    println!("   Last month: ${:.2}", insights.last_month_total);

    if !insights.anomalies.is_empty() {
        println!();
        println!("   📈 Unusual spending");
        for anomaly in &insights.anomalies {
            println!(
                "      {:<24} +{}% vs. 3-month average",
                truncate(&anomaly.category, 24),
                anomaly.percentage_increase
            );
        }
    }

    if !insights.recommendations.is_empty() {
        println!();
        println!("   🎯 Suggested budgets");
        for rec in &insights.recommendations {
            println!(
                "      {:<24} ${:>9.2} (avg ${:.2})",
                truncate(&rec.category, 24),
                rec.suggested_budget,
                rec.average_spending
            );
        }
    }

    if insights.anomalies.is_empty() && insights.recommendations.is_empty() {
        println!();
        println!("   Not enough history yet. Insights use the previous 3 months.");
    }

    Ok(())
}
