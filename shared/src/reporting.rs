//! Movement report aggregation
//!
//! Both report modes consume movements in presentation order: movement date
//! descending, then creation time descending, then product id ascending.

use std::collections::HashMap;

use uuid::Uuid;

use crate::models::{
    GroupedMovementRow, MovementEntry, MovementDetailRow, MovementType, NetDirection,
    NO_CATEGORY_DASH,
};

/// Join category names with `", "`, or return `placeholder` when empty
pub fn join_categories(categories: &[String], placeholder: &str) -> String {
    if categories.is_empty() {
        placeholder.to_string()
    } else {
        categories.join(", ")
    }
}

/// Attach a per-product running balance to each movement.
///
/// The balance is accumulated oldest to newest, so the row for a product's
/// latest movement carries its net change over the whole result set. Rows
/// keep their input (newest first) order.
pub fn with_running_balance(entries: Vec<MovementEntry>) -> Vec<MovementDetailRow> {
    let mut balances: HashMap<Uuid, i64> = HashMap::new();
    let mut running = vec![0i64; entries.len()];

    for (idx, entry) in entries.iter().enumerate().rev() {
        let balance = balances.entry(entry.product_id).or_insert(0);
        *balance += entry.movement_type.signed(entry.quantity);
        running[idx] = *balance;
    }

    entries
        .into_iter()
        .zip(running)
        .map(|(entry, balance)| MovementDetailRow {
            category: join_categories(&entry.categories, NO_CATEGORY_DASH),
            entry,
            balance,
        })
        .collect()
}

/// Fold movements into one summary row per product.
///
/// Products appear in the order they are first seen, which for
/// presentation-ordered input means most recently active first.
pub fn group_by_product(entries: Vec<MovementEntry>) -> Vec<GroupedMovementRow> {
    let mut index: HashMap<Uuid, usize> = HashMap::new();
    let mut rows: Vec<GroupedMovementRow> = Vec::new();

    for entry in entries {
        let slot = match index.get(&entry.product_id) {
            Some(&slot) => slot,
            None => {
                index.insert(entry.product_id, rows.len());
                rows.push(GroupedMovementRow {
                    product_id: entry.product_id,
                    code: entry.code.clone(),
                    name: entry.name.clone(),
                    category: join_categories(&entry.categories, NO_CATEGORY_DASH),
                    categories: entry.categories.clone(),
                    total_in: 0,
                    total_out: 0,
                    movement_count: 0,
                    last_movement_date: entry.date,
                    net: 0,
                    direction: NetDirection::Neutral,
                    quantity: 0,
                    balance: 0,
                });
                rows.len() - 1
            }
        };

        let row = &mut rows[slot];
        match entry.movement_type {
            MovementType::In => row.total_in += i64::from(entry.quantity),
            MovementType::Out => row.total_out += i64::from(entry.quantity),
        }
        row.movement_count += 1;
        if entry.date > row.last_movement_date {
            row.last_movement_date = entry.date;
        }
    }

    for row in &mut rows {
        row.net = row.total_in - row.total_out;
        row.direction = NetDirection::from_net(row.net);
        row.quantity = row.net.abs();
        row.balance = row.net;
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn entry(product: u128, movement_type: MovementType, quantity: i32, day: u32) -> MovementEntry {
        let date = Utc.with_ymd_and_hms(2024, 3, day, 9, 0, 0).unwrap();
        MovementEntry {
            id: Uuid::new_v4(),
            product_id: Uuid::from_u128(product),
            code: format!("P{}", product),
            name: format!("Producto {}", product),
            categories: vec![],
            movement_type,
            quantity,
            description: String::new(),
            date,
            created_at: date,
            user_name: None,
        }
    }

    #[test]
    fn test_join_categories() {
        let cats = vec!["Herramientas".to_string(), "Hogar".to_string()];
        assert_eq!(join_categories(&cats, "-"), "Herramientas, Hogar");
        assert_eq!(join_categories(&[], "Sin categoría"), "Sin categoría");
    }

    #[test]
    fn test_running_balance_is_chronological() {
        // newest first
        let rows = with_running_balance(vec![
            entry(1, MovementType::Out, 3, 5),
            entry(1, MovementType::In, 10, 2),
        ]);
        assert_eq!(rows[0].balance, 7);
        assert_eq!(rows[1].balance, 10);
    }

    #[test]
    fn test_running_balance_is_per_product() {
        let rows = with_running_balance(vec![
            entry(2, MovementType::In, 4, 6),
            entry(1, MovementType::Out, 1, 5),
            entry(2, MovementType::In, 1, 3),
            entry(1, MovementType::In, 2, 1),
        ]);
        let balances: Vec<i64> = rows.iter().map(|r| r.balance).collect();
        assert_eq!(balances, vec![5, 1, 1, 2]);
        assert_eq!(rows[0].category, "-");
    }

    #[test]
    fn test_grouped_neutral_when_balanced() {
        let rows = group_by_product(vec![
            entry(1, MovementType::Out, 5, 4),
            entry(1, MovementType::In, 5, 1),
        ]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].direction, NetDirection::Neutral);
        assert_eq!(rows[0].quantity, 0);
        assert_eq!(rows[0].movement_count, 2);
        assert_eq!(rows[0].last_movement_date.format("%d").to_string(), "04");
    }

    #[test]
    fn test_grouped_keeps_first_seen_order() {
        let rows = group_by_product(vec![
            entry(3, MovementType::Out, 2, 9),
            entry(1, MovementType::In, 7, 8),
            entry(3, MovementType::In, 1, 2),
        ]);
        assert_eq!(rows[0].product_id, Uuid::from_u128(3));
        assert_eq!(rows[0].direction, NetDirection::Out);
        assert_eq!(rows[0].quantity, 1);
        assert_eq!(rows[0].balance, -1);
        assert_eq!(rows[1].direction, NetDirection::In);
    }
}
