//! Report handlers

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Extension, Json,
};

use super::{required_month, MonthQuery};
use crate::{AppError, AppState, CurrentUser};
use tally_core::models::ReportRow;
use tally_core::report::monthly_report;

/// GET /api/reports/monthly?month=YYYY-MM - Budget vs. actual per category
///
/// Served with `Cache-Control: no-store` (set on the route).
pub async fn get_monthly_report(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Query(params): Query<MonthQuery>,
) -> Result<Json<Vec<ReportRow>>, AppError> {
    let month = required_month(params.month.as_deref())?;

    let rows = monthly_report(&state.db, &user.id, month)?;

    state.db.log_audit(
        &user.id,
        "report",
        Some("monthly"),
        None,
        Some(&format!("month={}, rows={}", month, rows.len())),
    )?;

    Ok(Json(rows))
}
