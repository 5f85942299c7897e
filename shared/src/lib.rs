//! Shared types and domain logic for the stock control service
//!
//! This crate holds everything that does not need a database connection:
//! the ledger arithmetic, report aggregation, export layout and input
//! validation. The backend binary wires it to PostgreSQL and HTTP.

pub mod export;
pub mod ledger;
pub mod models;
pub mod reporting;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
