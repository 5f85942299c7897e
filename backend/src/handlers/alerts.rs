//! Alert handlers

use axum::{
    extract::State,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::extract::ApiQuery;
use crate::services::alerts::AlertWithProduct;
use crate::services::AlertService;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct AlertQuery {
    pub limit: Option<i64>,
}

#[derive(Serialize)]
pub struct AlertsResponse {
    pub alerts: Vec<AlertWithProduct>,
}

/// Most recent stock alerts
pub async fn list_alerts(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<AlertQuery>,
) -> AppResult<Json<AlertsResponse>> {
    let max = state.config.reports.alert_list_limit.max(1);
    let limit = query.limit.unwrap_or(max).clamp(1, max);

    let service = AlertService::new(state.db.clone());
    let alerts = service.list_alerts(limit).await?;

    Ok(Json(AlertsResponse { alerts }))
}
