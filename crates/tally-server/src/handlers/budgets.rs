//! Budget handlers

use std::sync::Arc;

use axum::{
    extract::{Query, Request, State},
    Extension, Json,
};
use serde::Deserialize;

use super::{audit_write, read_json, required_month, IdInput, MonthQuery, NumberInput};
use crate::{AppError, AppState, CurrentUser};
use tally_core::models::{Budget, BudgetItem, BudgetItemType, BudgetWithCategory};

/// GET /api/budgets?month=YYYY-MM - List budgets for a month
pub async fn list_budgets(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Query(params): Query<MonthQuery>,
) -> Result<Json<Vec<BudgetWithCategory>>, AppError> {
    let month = required_month(params.month.as_deref())?;

    let budgets = state.db.list_budgets_for_month(&user.id, month)?;

    state.db.log_audit(
        &user.id,
        "list",
        Some("budget"),
        None,
        Some(&format!("month={}, count={}", month, budgets.len())),
    )?;

    Ok(Json(budgets))
}

/// A sub-item as sent by the client
#[derive(Debug, Deserialize)]
pub struct BudgetItemRequest {
    #[serde(default)]
    pub name: String,
    pub allocated: Option<NumberInput>,
    pub spent: Option<NumberInput>,
    #[serde(rename = "type", default)]
    pub item_type: BudgetItemType,
}

impl BudgetItemRequest {
    fn into_item(self) -> Result<BudgetItem, AppError> {
        Ok(BudgetItem {
            allocated: self
                .allocated
                .map(|n| n.value("allocated"))
                .transpose()?
                .unwrap_or(0.0),
            spent: self
                .spent
                .map(|n| n.value("spent"))
                .transpose()?
                .unwrap_or(0.0),
            name: self.name,
            item_type: self.item_type,
        })
    }
}

/// Request body for creating or updating a budget
#[derive(Debug, Deserialize)]
pub struct UpsertBudgetRequest {
    pub category: Option<IdInput>,
    pub month: Option<String>,
    pub limit: Option<NumberInput>,
    /// Omitted or null keeps existing items; a list replaces them
    pub items: Option<Vec<BudgetItemRequest>>,
}

/// POST /api/budgets - Create or update the budget for a category and month
pub async fn upsert_budget(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    request: Request,
) -> Result<Json<Budget>, AppError> {
    let req: UpsertBudgetRequest = read_json(request).await?;

    let category_id = req
        .category
        .ok_or_else(|| AppError::bad_request("category is required"))?
        .value("category")?;
    let month = required_month(req.month.as_deref())?;
    let limit = req
        .limit
        .ok_or_else(|| AppError::bad_request("limit is required"))?
        .value("limit")?;
    let items = req
        .items
        .map(|items| {
            items
                .into_iter()
                .map(BudgetItemRequest::into_item)
                .collect::<Result<Vec<_>, _>>()
        })
        .transpose()?;

    let budget =
        state
            .db
            .upsert_budget(&user.id, category_id, month, limit, items.as_deref())?;

    audit_write(
        &state.db,
        &user.id,
        "upsert",
        "budget",
        Some(budget.id),
        Some(&format!(
            "category={}, month={}, limit={}, items={}",
            category_id,
            month,
            limit,
            budget.items.len()
        )),
    );

    Ok(Json(budget))
}
