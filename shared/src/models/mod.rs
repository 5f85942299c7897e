//! Domain models for the stock control service

mod alert;
mod movement;
mod report;

pub use alert::*;
pub use movement::*;
pub use report::*;
