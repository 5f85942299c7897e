//! Dashboard handlers

use axum::{extract::State, Json};

use crate::error::AppResult;
use crate::services::dashboard::DashboardStats;
use crate::services::DashboardService;
use crate::AppState;

/// Dashboard counters and low-stock summary
pub async fn get_dashboard_stats(State(state): State<AppState>) -> AppResult<Json<DashboardStats>> {
    let service = DashboardService::new(state.db.clone());
    let stats = service
        .stats(state.config.reports.dashboard_alert_limit)
        .await?;
    Ok(Json(stats))
}
