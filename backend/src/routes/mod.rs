//! Route definitions for the stock control service

use axum::{
    middleware,
    routing::{get, patch, put},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .nest("/products", product_routes())
        .nest("/categories", category_routes())
        .nest("/movements", movement_routes())
        .route("/stock", get(handlers::get_stock))
        .route("/alerts", get(handlers::list_alerts))
        .route("/dashboard/stats", get(handlers::get_dashboard_stats))
        .nest("/reports", report_routes())
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        .merge(protected)
}

/// Product catalog routes
fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_products).post(handlers::create_product))
        .route(
            "/:product_id",
            get(handlers::get_product)
                .put(handlers::update_product)
                .delete(handlers::delete_product),
        )
        .route("/:product_id/status", patch(handlers::set_product_status))
}

/// Category catalog routes
fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_categories).post(handlers::create_category))
        .route(
            "/:category_id",
            put(handlers::update_category).delete(handlers::delete_category),
        )
}

/// Stock ledger routes
fn movement_routes() -> Router<AppState> {
    Router::new().route("/", get(handlers::list_movements).post(handlers::create_movement))
}

/// Report routes
fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::get_report))
        .route("/export", get(handlers::export_report))
}
