//! Spending insights
//!
//! Compares each category's spend in a reference month with its average over
//! the preceding months, flags sharp increases as anomalies and suggests a
//! rounded-up budget from the average.
//!
//! [`evaluate`] is pure: callers fetch [`CategoryActivity`] and pass the
//! reference month explicitly. [`analyze`] does both against a database.

use tracing::debug;

use crate::db::{CategoryActivity, Database};
use crate::error::Result;
use crate::models::{Anomaly, Insights, Recommendation};
use crate::month::Month;

/// Months before the reference month that make up the average
pub const TRAILING_MONTHS: u32 = 3;

/// Percentage increase over the average above which spend is anomalous
pub const ANOMALY_THRESHOLD_PERCENT: f64 = 150.0;

/// Suggested budgets are rounded up to a multiple of this
pub const RECOMMENDATION_STEP: f64 = 100.0;

/// Percentage by which `current` exceeds `average`
pub fn percentage_increase(current: f64, average: f64) -> f64 {
    (current - average) / average * 100.0
}

/// Smallest multiple of [`RECOMMENDATION_STEP`] at or above the average
pub fn recommend_budget(average: f64) -> f64 {
    (average / RECOMMENDATION_STEP).ceil() * RECOMMENDATION_STEP
}

/// Compute insights for a user's month from the database
pub fn analyze(db: &Database, user: &str, month: Month) -> Result<Insights> {
    let current_total = db.month_total(user, month)?;
    let last_total = db.month_total(user, month.prev())?;
    let activity = db.category_activity(user, month, TRAILING_MONTHS)?;

    let insights = evaluate(month, current_total, last_total, &activity);
    debug!(
        user,
        month = %month,
        categories = activity.len(),
        anomalies = insights.anomalies.len(),
        recommendations = insights.recommendations.len(),
        "Insights computed"
    );
    Ok(insights)
}

/// Derive anomalies and recommendations from per-category activity
pub fn evaluate(
    month: Month,
    current_month_total: f64,
    last_month_total: f64,
    activity: &[CategoryActivity],
) -> Insights {
    let mut anomalies = Vec::new();
    let mut recommendations = Vec::new();

    for entry in activity {
        // Always over the full window, even if the category is newer
        let average = entry.trailing_total / TRAILING_MONTHS as f64;
        let current = entry.current_month_spending;
        let category = &entry.category;

        if current > 0.0 && average > 0.0 {
            let increase = percentage_increase(current, average);
            if increase > ANOMALY_THRESHOLD_PERCENT {
                anomalies.push(Anomaly {
                    category_id: category.id,
                    category: category.name.clone(),
                    color: category.color.clone(),
                    percentage_increase: increase.round() as i64,
                });
            }
        }

        if average > 0.0 {
            recommendations.push(Recommendation {
                category_id: category.id,
                category: category.name.clone(),
                color: category.color.clone(),
                average_spending: average,
                suggested_budget: recommend_budget(average),
            });
        }
    }

    Insights {
        month,
        current_month_total,
        last_month_total,
        anomalies,
        recommendations,
    }
}
