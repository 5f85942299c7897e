//! Stock ledger arithmetic
//!
//! Computes the effect of a single movement on a product's cached stock and
//! decides which alert, if any, the movement raises. The backend applies the
//! resulting [`StockPosting`] inside one database transaction.

use serde::Serialize;
use thiserror::Error;

use crate::models::{AlertKind, MovementType};

/// Reasons a movement cannot be posted
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("Quantity must be positive, got {0}")]
    NonPositiveQuantity(i32),

    #[error("Insufficient stock: {available} available, {requested} requested")]
    InsufficientStock { available: i32, requested: i32 },

    #[error("Stock would exceed the maximum representable value")]
    Overflow,
}

/// Outcome of posting one movement against a product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockPosting {
    pub previous_stock: i32,
    pub new_stock: i32,
    pub alert: Option<AlertKind>,
}

/// Apply a movement of `quantity` units to `current_stock`.
///
/// Outgoing movements may never take stock below zero. Only outgoing
/// movements raise alerts: `OutOfStock` when the result is exactly zero,
/// `LowStock` when it lands in `1..=min_stock`.
pub fn post(
    current_stock: i32,
    min_stock: i32,
    movement_type: MovementType,
    quantity: i32,
) -> Result<StockPosting, LedgerError> {
    if quantity <= 0 {
        return Err(LedgerError::NonPositiveQuantity(quantity));
    }

    let new_stock = match movement_type {
        MovementType::In => current_stock
            .checked_add(quantity)
            .ok_or(LedgerError::Overflow)?,
        MovementType::Out => {
            if quantity > current_stock {
                return Err(LedgerError::InsufficientStock {
                    available: current_stock,
                    requested: quantity,
                });
            }
            current_stock - quantity
        }
    };

    Ok(StockPosting {
        previous_stock: current_stock,
        new_stock,
        alert: alert_for(movement_type, new_stock, min_stock),
    })
}

/// Alert raised by a movement that leaves the product at `new_stock`
pub fn alert_for(movement_type: MovementType, new_stock: i32, min_stock: i32) -> Option<AlertKind> {
    match movement_type {
        MovementType::In => None,
        MovementType::Out if new_stock == 0 => Some(AlertKind::OutOfStock),
        MovementType::Out if new_stock > 0 && new_stock <= min_stock => Some(AlertKind::LowStock),
        MovementType::Out => None,
    }
}

/// A product is low on stock once it is at or below its minimum
pub fn is_low_stock(current_stock: i32, min_stock: i32) -> bool {
    current_stock <= min_stock
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_adds_stock_without_alert() {
        let posting = post(0, 5, MovementType::In, 12).unwrap();
        assert_eq!(posting.new_stock, 12);
        assert_eq!(posting.alert, None);
    }

    #[test]
    fn test_in_below_minimum_raises_nothing() {
        let posting = post(0, 5, MovementType::In, 1).unwrap();
        assert_eq!(posting.new_stock, 1);
        assert_eq!(posting.alert, None);
    }

    #[test]
    fn test_out_into_low_band() {
        let posting = post(10, 5, MovementType::Out, 6).unwrap();
        assert_eq!(posting.previous_stock, 10);
        assert_eq!(posting.new_stock, 4);
        assert_eq!(posting.alert, Some(AlertKind::LowStock));
    }

    #[test]
    fn test_out_to_zero_is_out_of_stock_only() {
        let posting = post(4, 5, MovementType::Out, 4).unwrap();
        assert_eq!(posting.new_stock, 0);
        assert_eq!(posting.alert, Some(AlertKind::OutOfStock));
    }

    #[test]
    fn test_out_exactly_at_minimum_is_low() {
        let posting = post(8, 5, MovementType::Out, 3).unwrap();
        assert_eq!(posting.new_stock, 5);
        assert_eq!(posting.alert, Some(AlertKind::LowStock));
    }

    #[test]
    fn test_out_above_minimum_no_alert() {
        let posting = post(20, 5, MovementType::Out, 3).unwrap();
        assert_eq!(posting.new_stock, 17);
        assert_eq!(posting.alert, None);
    }

    #[test]
    fn test_out_with_zero_minimum_only_alerts_at_zero() {
        assert_eq!(post(3, 0, MovementType::Out, 2).unwrap().alert, None);
        assert_eq!(
            post(3, 0, MovementType::Out, 3).unwrap().alert,
            Some(AlertKind::OutOfStock)
        );
    }

    #[test]
    fn test_insufficient_stock_rejected() {
        let err = post(3, 5, MovementType::Out, 5).unwrap_err();
        assert_eq!(
            err,
            LedgerError::InsufficientStock {
                available: 3,
                requested: 5
            }
        );
    }

    #[test]
    fn test_non_positive_quantity_rejected() {
        assert_eq!(
            post(3, 5, MovementType::In, 0).unwrap_err(),
            LedgerError::NonPositiveQuantity(0)
        );
        assert_eq!(
            post(3, 5, MovementType::Out, -2).unwrap_err(),
            LedgerError::NonPositiveQuantity(-2)
        );
    }

    #[test]
    fn test_overflow_rejected() {
        assert_eq!(
            post(i32::MAX, 0, MovementType::In, 1).unwrap_err(),
            LedgerError::Overflow
        );
    }

    #[test]
    fn test_low_stock_includes_minimum() {
        assert!(is_low_stock(5, 5));
        assert!(is_low_stock(0, 0));
        assert!(!is_low_stock(6, 5));
    }
}
