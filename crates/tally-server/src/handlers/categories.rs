//! Category management handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Request, State},
    Extension, Json,
};
use serde::Deserialize;

use super::{audit_write, read_json};
use crate::{AppError, AppState, CurrentUser, SuccessResponse};
use tally_core::models::{Category, CategoryUpdate, NewCategory};

/// GET /api/categories - List the caller's categories
pub async fn list_categories(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<Vec<Category>>, AppError> {
    let categories = state.db.list_categories(&user.id)?;

    state.db.log_audit(
        &user.id,
        "list",
        Some("category"),
        None,
        Some(&format!("count={}", categories.len())),
    )?;

    Ok(Json(categories))
}

/// GET /api/categories/:id - Get a specific category
pub async fn get_category(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<Json<Category>, AppError> {
    let category = state
        .db
        .get_category(&user.id, id)?
        .ok_or_else(|| AppError::not_found("Category not found"))?;

    state
        .db
        .log_audit(&user.id, "view", Some("category"), Some(id), None)?;

    Ok(Json(category))
}

/// Request body for creating a category
#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    #[serde(default)]
    pub name: String,
    pub color: Option<String>,
}

/// POST /api/categories - Create a category
pub async fn create_category(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    request: Request,
) -> Result<Json<Category>, AppError> {
    let req: CreateCategoryRequest = read_json(request).await?;

    let category = state.db.create_category(
        &user.id,
        &NewCategory {
            name: req.name,
            color: req.color,
        },
    )?;

    audit_write(
        &state.db,
        &user.id,
        "create",
        "category",
        Some(category.id),
        Some(&format!("name={}", category.name)),
    );

    Ok(Json(category))
}

/// Request body for updating a category
#[derive(Debug, Deserialize)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub color: Option<String>,
}

/// PUT /api/categories/:id - Update name and/or color
pub async fn update_category(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<Category>, AppError> {
    let req: UpdateCategoryRequest = read_json(request).await?;

    let category = state
        .db
        .update_category(
            &user.id,
            id,
            &CategoryUpdate {
                name: req.name,
                color: req.color,
            },
        )?
        .ok_or_else(|| AppError::not_found("Category not found"))?;

    audit_write(&state.db, &user.id, "update", "category", Some(id), None);

    Ok(Json(category))
}

/// DELETE /api/categories/:id - Delete a category
///
/// Budgets and expenses that reference it are kept.
pub async fn delete_category(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<Json<SuccessResponse>, AppError> {
    if !state.db.delete_category(&user.id, id)? {
        return Err(AppError::not_found("Category not found"));
    }

    audit_write(&state.db, &user.id, "delete", "category", Some(id), None);

    Ok(Json(SuccessResponse { success: true }))
}
