//! Category catalog handlers

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::Serialize;
use uuid::Uuid;
use validator::Validate;

use crate::error::AppResult;
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::CurrentUser;
use crate::services::categories::{Category, CategoryInput, CategoryWithCount};
use crate::services::CategoryService;
use crate::AppState;

/// Response for list of categories
#[derive(Serialize)]
pub struct CategoriesResponse {
    pub categories: Vec<CategoryWithCount>,
}

/// List all categories
pub async fn list_categories(State(state): State<AppState>) -> AppResult<Json<CategoriesResponse>> {
    let service = CategoryService::new(state.db.clone());
    let categories = service.list_categories().await?;
    Ok(Json(CategoriesResponse { categories }))
}

/// Create a category
pub async fn create_category(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(input): ApiJson<CategoryInput>,
) -> AppResult<(StatusCode, Json<Category>)> {
    input.validate()?;

    let service = CategoryService::new(state.db.clone());
    let category = service.create_category(input).await?;

    tracing::debug!(user_id = %user.user_id, category_id = %category.id, "create category request served");

    Ok((StatusCode::CREATED, Json(category)))
}

/// Update a category
pub async fn update_category(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(category_id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<CategoryInput>,
) -> AppResult<Json<Category>> {
    input.validate()?;

    let service = CategoryService::new(state.db.clone());
    let category = service.update_category(category_id, input).await?;

    tracing::debug!(user_id = %user.user_id, category_id = %category_id, "update category request served");

    Ok(Json(category))
}

/// Delete a category with no linked products
pub async fn delete_category(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(category_id): ApiPath<Uuid>,
) -> AppResult<StatusCode> {
    let service = CategoryService::new(state.db.clone());
    service.delete_category(category_id).await?;

    tracing::debug!(user_id = %user.user_id, category_id = %category_id, "delete category request served");

    Ok(StatusCode::NO_CONTENT)
}
