//! Stock movement handlers

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::extract::{ApiJson, ApiQuery};
use crate::middleware::CurrentUser;
use crate::services::movements::{
    MovementFilter, MovementWithRelations, NewMovement, PostMovementInput, PostedMovement,
};
use crate::services::MovementService;
use crate::AppState;
use shared::{MovementType, PageRequest, PaginatedResponse};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementListQuery {
    pub product_id: Option<Uuid>,
    #[serde(rename = "type")]
    pub movement_type: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// List movements, newest first
pub async fn list_movements(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<MovementListQuery>,
) -> AppResult<Json<PaginatedResponse<MovementWithRelations>>> {
    let movement_type = match query.movement_type.as_deref() {
        None | Some("") | Some("all") => None,
        Some(raw) => Some(raw.parse::<MovementType>().map_err(|_| {
            AppError::invalid("type", "Type must be IN or OUT", "El tipo debe ser IN u OUT")
        })?),
    };

    let page = PageRequest {
        limit: query.limit,
        offset: query.offset,
    };
    let (limit, offset) = page.resolve(
        state.config.reports.default_page_size,
        state.config.reports.max_page_size,
    );

    let filter = MovementFilter {
        product_id: query.product_id,
        movement_type,
    };

    let service = MovementService::new(state.db.clone());
    let movements = service.list_movements(filter, limit, offset).await?;

    Ok(Json(movements))
}

/// Record an inflow or outflow for a product
pub async fn create_movement(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(input): ApiJson<PostMovementInput>,
) -> AppResult<(StatusCode, Json<PostedMovement>)> {
    let movement = NewMovement::try_from(input)?;

    tracing::debug!(
        user_id = %user.user_id,
        user_name = user.name.as_deref().unwrap_or("-"),
        product_id = %movement.product_id,
        "posting movement"
    );

    let service = MovementService::new(state.db.clone());
    let posted = service.post_movement(user.user_id, movement).await?;

    Ok((StatusCode::CREATED, Json(posted)))
}
