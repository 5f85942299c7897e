//! Dashboard counters

use chrono::Local;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::day_bounds;

/// Dashboard service
#[derive(Clone)]
pub struct DashboardService {
    db: PgPool,
}

/// Quantities moved today
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct TodayMovements {
    #[serde(rename = "in")]
    pub total_in: i64,
    #[serde(rename = "out")]
    pub total_out: i64,
}

/// Low-stock product as summarized on the dashboard
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LowStockProduct {
    pub name: String,
    pub current_stock: i32,
    pub min_stock: i32,
}

/// Dashboard low-stock notice
#[derive(Debug, Serialize)]
pub struct DashboardAlert {
    pub id: Uuid,
    pub message: String,
    pub product: LowStockProduct,
}

/// Dashboard statistics
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_products: i64,
    pub low_stock_products: i64,
    pub today_movements: TodayMovements,
    pub alerts: Vec<DashboardAlert>,
}

#[derive(FromRow)]
struct LowStockRow {
    id: Uuid,
    name: String,
    current_stock: i32,
    min_stock: i32,
}

impl From<LowStockRow> for DashboardAlert {
    fn from(row: LowStockRow) -> Self {
        DashboardAlert {
            id: row.id,
            message: format!("{} tiene stock bajo", row.name),
            product: LowStockProduct {
                name: row.name,
                current_stock: row.current_stock,
                min_stock: row.min_stock,
            },
        }
    }
}

impl DashboardService {
    /// Create a new DashboardService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Counters for the dashboard; "today" is the server's local calendar day
    pub async fn stats(&self, alert_limit: i64) -> AppResult<DashboardStats> {
        let (total_products, low_stock_products) = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT COUNT(*),
                   COUNT(*) FILTER (WHERE current_stock <= min_stock)
            FROM products
            WHERE is_active
            "#,
        )
        .fetch_one(&self.db)
        .await?;

        let (today_start, tomorrow_start) = day_bounds(&Local, Local::now().date_naive())
            .ok_or_else(|| AppError::Internal("cannot resolve local day boundaries".to_string()))?;

        let (total_in, total_out) = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT COALESCE(SUM(quantity) FILTER (WHERE type = 'IN'), 0)::BIGINT,
                   COALESCE(SUM(quantity) FILTER (WHERE type = 'OUT'), 0)::BIGINT
            FROM movements
            WHERE created_at >= $1 AND created_at < $2
            "#,
        )
        .bind(today_start)
        .bind(tomorrow_start)
        .fetch_one(&self.db)
        .await?;

        let alerts = sqlx::query_as::<_, LowStockRow>(
            r#"
            SELECT id, name, current_stock, min_stock
            FROM products
            WHERE is_active AND current_stock <= min_stock
            ORDER BY current_stock ASC, name ASC
            LIMIT $1
            "#,
        )
        .bind(alert_limit)
        .fetch_all(&self.db)
        .await?;

        Ok(DashboardStats {
            total_products,
            low_stock_products,
            today_movements: TodayMovements {
                total_in,
                total_out,
            },
            alerts: alerts.into_iter().map(DashboardAlert::from).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_message_and_shape() {
        let alert = DashboardAlert::from(LowStockRow {
            id: Uuid::nil(),
            name: "Tornillo".to_string(),
            current_stock: 2,
            min_stock: 5,
        });
        assert_eq!(alert.message, "Tornillo tiene stock bajo");

        let json = serde_json::to_value(&alert).unwrap();
        assert_eq!(json["product"]["currentStock"], 2);
        assert_eq!(json["product"]["minStock"], 5);
    }

    #[test]
    fn test_today_movements_keys() {
        let json = serde_json::to_value(TodayMovements {
            total_in: 12,
            total_out: 4,
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({ "in": 12, "out": 4 }));
    }
}
