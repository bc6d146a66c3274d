//! Expense handlers

use std::sync::Arc;

use axum::{
    extract::{Query, Request, State},
    Extension, Json,
};
use serde::Deserialize;

use super::{audit_write, read_json, required_month, IdInput, MonthQuery, NumberInput};
use crate::{AppError, AppState, CurrentUser};
use tally_core::models::{ExpenseOutcome, ExpenseWithCategory, NewExpense};
use tally_core::{parse_expense_date, Ledger};

/// Request body for logging an expense
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateExpenseRequest {
    pub category: Option<IdInput>,
    pub amount: Option<NumberInput>,
    pub date: Option<String>,
    pub sub_item_name: Option<String>,
}

/// POST /api/expenses - Log an expense and reconcile it against the budget
pub async fn create_expense(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    request: Request,
) -> Result<Json<ExpenseOutcome>, AppError> {
    let req: CreateExpenseRequest = read_json(request).await?;

    let category_id = req
        .category
        .ok_or_else(|| AppError::bad_request("category is required"))?
        .value("category")?;
    let amount = req
        .amount
        .ok_or_else(|| AppError::bad_request("amount is required"))?
        .value("amount")?;
    let date = req
        .date
        .as_deref()
        .ok_or_else(|| AppError::bad_request("date is required"))?;
    let date = parse_expense_date(date)?;

    let outcome = Ledger::new(&state.db).record_expense(
        &user.id,
        &NewExpense {
            category_id,
            amount,
            date,
            sub_item_name: req.sub_item_name,
        },
    )?;

    audit_write(
        &state.db,
        &user.id,
        "create",
        "expense",
        Some(outcome.expense.id),
        Some(&format!(
            "category={}, amount={}, date={}, over={}",
            category_id, amount, date, outcome.over
        )),
    );

    Ok(Json(outcome))
}

/// GET /api/expenses/month?month=YYYY-MM - List expenses for a month
pub async fn list_expenses_for_month(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Query(params): Query<MonthQuery>,
) -> Result<Json<Vec<ExpenseWithCategory>>, AppError> {
    let month = required_month(params.month.as_deref())?;

    let expenses = state.db.list_expenses_for_month(&user.id, month)?;

    state.db.log_audit(
        &user.id,
        "list",
        Some("expense"),
        None,
        Some(&format!("month={}, count={}", month, expenses.len())),
    )?;

    Ok(Json(expenses))
}
