//! Insight handlers

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Extension, Json,
};

use super::{required_month, MonthQuery};
use crate::{AppError, AppState, CurrentUser};
use tally_core::insights::analyze;
use tally_core::models::Insights;
use tally_core::Month;

/// GET /api/insights?month=YYYY-MM - Trend anomalies and budget recommendations
///
/// Defaults to the current UTC month.
pub async fn get_insights(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Query(params): Query<MonthQuery>,
) -> Result<Json<Insights>, AppError> {
    let month = match params.month.as_deref() {
        Some(m) => required_month(Some(m))?,
        None => Month::current(),
    };

    let insights = analyze(&state.db, &user.id, month)?;

    state.db.log_audit(
        &user.id,
        "report",
        Some("insights"),
        None,
        Some(&format!(
            "month={}, anomalies={}, recommendations={}",
            month,
            insights.anomalies.len(),
            insights.recommendations.len()
        )),
    )?;

    Ok(Json(insights))
}
