//! Monthly budget-vs-actual report

use std::collections::HashMap;

use tracing::debug;

use crate::db::Database;
use crate::error::Result;
use crate::models::{Category, ReportRow};
use crate::month::Month;

/// Build the report for a user's month
pub fn monthly_report(db: &Database, user: &str, month: Month) -> Result<Vec<ReportRow>> {
    let categories = db.list_categories(user)?;
    let limits = db.budget_limits_for_month(user, month)?;
    let spent = db.spending_by_category(user, month)?;

    let rows = assemble_report(categories, &limits, &spent);
    debug!(user, month = %month, rows = rows.len(), "Monthly report built");
    Ok(rows)
}

/// One row per category with a budget or spend; everything else is dropped
///
/// Limits and spend keyed by ids absent from `categories` (deleted
/// categories) never produce rows.
pub fn assemble_report(
    categories: Vec<Category>,
    limits: &HashMap<i64, f64>,
    spent: &HashMap<i64, f64>,
) -> Vec<ReportRow> {
    categories
        .into_iter()
        .filter_map(|category| {
            let budget = limits.get(&category.id).copied().unwrap_or(0.0);
            let spent = spent.get(&category.id).copied().unwrap_or(0.0);
            if budget == 0.0 && spent == 0.0 {
                return None;
            }
            Some(ReportRow {
                category,
                budget,
                spent,
                remaining: budget - spent,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Ledger;
    use crate::models::{NewCategory, NewExpense};
    use chrono::{NaiveDate, Utc};

    const USER: &str = "alice@example.com";

    fn category(id: i64, name: &str) -> Category {
        Category {
            id,
            user: USER.to_string(),
            name: name.to_string(),
            color: "#3B82F6".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_assemble_omits_idle_categories() {
        let categories = vec![
            category(1, "Food"),
            category(2, "Rent"),
            category(3, "Travel"),
        ];
        let limits = HashMap::from([(1, 400.0), (2, 0.0)]);
        let spent = HashMap::from([(1, 450.0), (3, 80.0)]);

        let rows = assemble_report(categories, &limits, &spent);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].category.name, "Food");
        assert_eq!(rows[0].remaining, -50.0);
        assert_eq!(rows[1].category.name, "Travel");
        assert_eq!(rows[1].budget, 0.0);
        assert_eq!(rows[1].remaining, -80.0);
    }

    #[test]
    fn test_assemble_skips_orphaned_ids() {
        let limits = HashMap::from([(99, 100.0)]);
        let spent = HashMap::from([(99, 20.0)]);

        let rows = assemble_report(vec![category(1, "Food")], &limits, &spent);
        assert!(rows.is_empty());
    }

    #[test]
    fn test_monthly_report_from_database() {
        let db = Database::in_memory().unwrap();
        let food = db
            .create_category(
                USER,
                &NewCategory {
                    name: "Food".to_string(),
                    color: None,
                },
            )
            .unwrap();
        let rent = db
            .create_category(
                USER,
                &NewCategory {
                    name: "Rent".to_string(),
                    color: Some("#10B981".to_string()),
                },
            )
            .unwrap();
        let month: Month = "2025-03".parse().unwrap();

        db.upsert_budget(USER, rent.id, month, 1200.0, None).unwrap();
        let ledger = Ledger::new(&db);
        for (day, amount) in [(3, 40.0), (17, 60.5)] {
            ledger
                .record_expense(
                    USER,
                    &NewExpense {
                        category_id: food.id,
                        amount,
                        date: NaiveDate::from_ymd_opt(2025, 3, day).unwrap(),
                        sub_item_name: None,
                    },
                )
                .unwrap();
        }

        let rows = monthly_report(&db, USER, month).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].category.id, food.id);
        assert_eq!(rows[0].spent, 100.5);
        assert_eq!(rows[1].category.id, rent.id);
        assert_eq!(rows[1].remaining, 1200.0);

        // Another user sees nothing
        assert!(monthly_report(&db, "bob@example.com", month)
            .unwrap()
            .is_empty());
        // Neither does an empty month
        assert!(monthly_report(&db, USER, month.next()).unwrap().is_empty());
    }
}
