//! HTTP request handlers

pub mod alerts;
pub mod categories;
pub mod dashboard;
pub mod health;
pub mod movements;
pub mod products;
pub mod reporting;

pub use alerts::list_alerts;
pub use categories::{create_category, delete_category, list_categories, update_category};
pub use dashboard::get_dashboard_stats;
pub use health::health_check;
pub use movements::{create_movement, list_movements};
pub use products::{
    create_product, delete_product, get_product, get_stock, list_products, set_product_status,
    update_product,
};
pub use reporting::{export_report, get_report};

use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Category query parameter: absent, empty or `all` means no filter
pub(crate) fn category_filter(raw: Option<&str>) -> AppResult<Option<Uuid>> {
    match raw.map(str::trim) {
        None | Some("") | Some("all") => Ok(None),
        Some(raw) => Uuid::parse_str(raw)
            .map(Some)
            .map_err(|_| AppError::invalid("category", "Invalid category", "Categoría inválida")),
    }
}
