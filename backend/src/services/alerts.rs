//! Stock alert listing

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::AppResult;
use shared::AlertKind;

/// Alert service
#[derive(Clone)]
pub struct AlertService {
    db: PgPool,
}

/// Alert record, written only by movement posting
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: Uuid,
    #[serde(rename = "type")]
    #[sqlx(rename = "type", try_from = "String")]
    pub kind: AlertKind,
    pub message: String,
    pub product_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Alert with the product it refers to
#[derive(Debug, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AlertWithProduct {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub alert: Alert,
    pub product_name: String,
    pub product_code: String,
}

impl AlertService {
    /// Create a new AlertService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Most recent alerts first
    pub async fn list_alerts(&self, limit: i64) -> AppResult<Vec<AlertWithProduct>> {
        let alerts = sqlx::query_as::<_, AlertWithProduct>(
            r#"
            SELECT a.id, a.type, a.message, a.product_id, a.created_at,
                   p.name AS product_name, p.code AS product_code
            FROM alerts a
            JOIN products p ON p.id = a.product_id
            ORDER BY a.created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        Ok(alerts)
    }
}
