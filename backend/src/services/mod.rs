//! Business logic services for the stock control service

pub mod alerts;
pub mod categories;
pub mod dashboard;
pub mod export;
pub mod movements;
pub mod products;
pub mod reporting;

#[cfg(test)]
mod catalog_db_tests;

pub use alerts::AlertService;
pub use categories::CategoryService;
pub use dashboard::DashboardService;
pub use movements::MovementService;
pub use products::ProductService;
pub use reporting::ReportingService;
