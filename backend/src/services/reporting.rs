//! Reporting service: stock snapshot, low-stock and movement reports

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::reporting::{group_by_product, with_running_balance};
use shared::{
    DateRange, GroupedMovementRow, MovementDetailRow, MovementEntry, MovementType, ReportType,
    StockRow,
};

/// Reporting service
#[derive(Clone)]
pub struct ReportingService {
    db: PgPool,
}

/// Report filters as received on the query string
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportQuery {
    #[serde(rename = "type")]
    pub report_type: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub category: Option<String>,
    pub product_id: Option<Uuid>,
    pub movement_type: Option<String>,
    pub group_by_product: Option<bool>,
    pub format: Option<String>,
}

/// Validated report request
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRequest {
    pub report_type: ReportType,
    /// Present exactly when `report_type` is `Movements`
    pub range: Option<DateRange>,
    pub category_id: Option<Uuid>,
    pub product_id: Option<Uuid>,
    pub movement_type: Option<MovementType>,
    pub group_by_product: bool,
}

impl TryFrom<&ReportQuery> for ReportRequest {
    type Error = AppError;

    fn try_from(query: &ReportQuery) -> Result<Self, Self::Error> {
        let report_type = query
            .report_type
            .as_deref()
            .ok_or_else(|| {
                AppError::invalid(
                    "type",
                    "Report type is required",
                    "El tipo de reporte es obligatorio",
                )
            })?
            .parse::<ReportType>()
            .map_err(|_| {
                AppError::invalid("type", "Invalid report type", "Tipo de reporte inválido")
            })?;

        let category_id = match query.category.as_deref().map(str::trim) {
            None | Some("") | Some("all") => None,
            Some(raw) => Some(Uuid::parse_str(raw).map_err(|_| {
                AppError::invalid("category", "Invalid category", "Categoría inválida")
            })?),
        };

        let movement_type = match query.movement_type.as_deref().map(str::trim) {
            None | Some("") | Some("all") => None,
            Some(raw) => Some(raw.parse::<MovementType>().map_err(|_| {
                AppError::invalid(
                    "movementType",
                    "Movement type must be IN or OUT",
                    "El tipo de movimiento debe ser IN u OUT",
                )
            })?),
        };

        let range = match report_type {
            ReportType::Movements => {
                let (start, end) = query.start_date.zip(query.end_date).ok_or_else(|| {
                    AppError::invalid(
                        "startDate",
                        "Start and end dates are required for movements report",
                        "Las fechas de inicio y fin son obligatorias para el reporte de movimientos",
                    )
                })?;
                Some(DateRange::new(start, end).map_err(|msg| {
                    AppError::invalid(
                        "startDate",
                        msg,
                        "La fecha de inicio no puede ser posterior a la fecha de fin",
                    )
                })?)
            }
            ReportType::Stock | ReportType::LowStock => None,
        };

        Ok(ReportRequest {
            report_type,
            range,
            category_id,
            product_id: query.product_id,
            movement_type,
            group_by_product: query.group_by_product.unwrap_or(false),
        })
    }
}

/// Report rows, shaped per report type
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ReportData {
    Products { products: Vec<StockRow> },
    Movements { movements: Vec<MovementDetailRow> },
    Grouped { movements: Vec<GroupedMovementRow> },
}

impl ReportData {
    pub fn row_count(&self) -> usize {
        match self {
            ReportData::Products { products } => products.len(),
            ReportData::Movements { movements } => movements.len(),
            ReportData::Grouped { movements } => movements.len(),
        }
    }

    pub fn is_grouped(&self) -> bool {
        matches!(self, ReportData::Grouped { .. })
    }
}

#[derive(FromRow)]
struct StockRecord {
    id: Uuid,
    code: String,
    name: String,
    unit: String,
    current_stock: i32,
    min_stock: i32,
    categories: Vec<String>,
}

impl From<StockRecord> for StockRow {
    fn from(r: StockRecord) -> Self {
        StockRow::new(
            r.id,
            r.code,
            r.name,
            r.unit,
            r.current_stock,
            r.min_stock,
            r.categories,
        )
    }
}

#[derive(FromRow)]
struct MovementRecord {
    id: Uuid,
    product_id: Uuid,
    code: String,
    name: String,
    categories: Vec<String>,
    #[sqlx(rename = "type", try_from = "String")]
    movement_type: MovementType,
    quantity: i32,
    description: String,
    date: DateTime<Utc>,
    created_at: DateTime<Utc>,
    user_name: Option<String>,
}

impl From<MovementRecord> for MovementEntry {
    fn from(r: MovementRecord) -> Self {
        MovementEntry {
            id: r.id,
            product_id: r.product_id,
            code: r.code,
            name: r.name,
            categories: r.categories,
            movement_type: r.movement_type,
            quantity: r.quantity,
            description: r.description,
            date: r.date,
            created_at: r.created_at,
            user_name: r.user_name,
        }
    }
}

impl ReportingService {
    /// Create a new ReportingService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Build the report described by `request`
    pub async fn generate(&self, request: &ReportRequest) -> AppResult<ReportData> {
        let data = match (request.report_type, request.range) {
            (ReportType::Stock, _) => ReportData::Products {
                products: self.stock_rows(request, false).await?,
            },
            (ReportType::LowStock, _) => ReportData::Products {
                products: self.stock_rows(request, true).await?,
            },
            (ReportType::Movements, Some(range)) => {
                let entries = self.movement_entries(request, range).await?;
                if request.group_by_product {
                    ReportData::Grouped {
                        movements: group_by_product(entries),
                    }
                } else {
                    ReportData::Movements {
                        movements: with_running_balance(entries),
                    }
                }
            }
            (ReportType::Movements, None) => {
                return Err(AppError::invalid(
                    "startDate",
                    "Start and end dates are required for movements report",
                    "Las fechas de inicio y fin son obligatorias para el reporte de movimientos",
                ))
            }
        };

        tracing::debug!(
            report_type = %request.report_type,
            grouped = data.is_grouped(),
            rows = data.row_count(),
            "report generated"
        );

        Ok(data)
    }

    /// Active products, optionally only those at or below their minimum
    async fn stock_rows(&self, request: &ReportRequest, low_only: bool) -> AppResult<Vec<StockRow>> {
        let records = sqlx::query_as::<_, StockRecord>(
            r#"
            SELECT p.id, p.code, p.name, p.unit, p.current_stock, p.min_stock,
                   ARRAY(
                       SELECT c.name FROM product_categories pc
                       JOIN categories c ON c.id = pc.category_id
                       WHERE pc.product_id = p.id
                       ORDER BY c.name
                   ) AS categories
            FROM products p
            WHERE p.is_active
              AND (NOT $1 OR p.current_stock <= p.min_stock)
              AND ($2::uuid IS NULL OR EXISTS (
                   SELECT 1 FROM product_categories pc
                   WHERE pc.product_id = p.id AND pc.category_id = $2))
              AND ($3::uuid IS NULL OR p.id = $3)
            ORDER BY p.name ASC
            "#,
        )
        .bind(low_only)
        .bind(request.category_id)
        .bind(request.product_id)
        .fetch_all(&self.db)
        .await?;

        Ok(records.into_iter().map(StockRow::from).collect())
    }

    /// Movements dated within the range, in presentation order
    async fn movement_entries(
        &self,
        request: &ReportRequest,
        range: DateRange,
    ) -> AppResult<Vec<MovementEntry>> {
        let (from, to) = range.to_utc_bounds(&Local).ok_or_else(|| {
            AppError::invalid("startDate", "Invalid date range", "Rango de fechas inválido")
        })?;

        let records = sqlx::query_as::<_, MovementRecord>(
            r#"
            SELECT m.id, m.product_id, p.code, p.name,
                   ARRAY(
                       SELECT c.name FROM product_categories pc
                       JOIN categories c ON c.id = pc.category_id
                       WHERE pc.product_id = m.product_id
                       ORDER BY c.name
                   ) AS categories,
                   m.type, m.quantity, m.description, m.date, m.created_at,
                   u.name AS user_name
            FROM movements m
            JOIN products p ON p.id = m.product_id
            LEFT JOIN users u ON u.id = m.user_id
            WHERE m.date >= $1 AND m.date < $2
              AND ($3::uuid IS NULL OR EXISTS (
                   SELECT 1 FROM product_categories pc
                   WHERE pc.product_id = m.product_id AND pc.category_id = $3))
              AND ($4::uuid IS NULL OR m.product_id = $4)
              AND ($5::text IS NULL OR m.type = $5)
            ORDER BY m.date DESC, m.created_at DESC, m.product_id ASC
            "#,
        )
        .bind(from)
        .bind(to)
        .bind(request.category_id)
        .bind(request.product_id)
        .bind(request.movement_type.map(|t| t.as_str()))
        .fetch_all(&self.db)
        .await?;

        Ok(records.into_iter().map(MovementEntry::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(json: serde_json::Value) -> ReportQuery {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_type_is_required() {
        let err = ReportRequest::try_from(&ReportQuery::default()).unwrap_err();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "type"));

        let err = ReportRequest::try_from(&query(serde_json::json!({ "type": "sales" }))).unwrap_err();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "type"));
    }

    #[test]
    fn test_category_all_means_no_filter() {
        let request =
            ReportRequest::try_from(&query(serde_json::json!({ "type": "stock", "category": "all" })))
                .unwrap();
        assert_eq!(request.report_type, ReportType::Stock);
        assert_eq!(request.category_id, None);
        assert_eq!(request.range, None);

        let id = Uuid::new_v4();
        let request = ReportRequest::try_from(&query(
            serde_json::json!({ "type": "lowStock", "category": id.to_string() }),
        ))
        .unwrap();
        assert_eq!(request.category_id, Some(id));
    }

    #[test]
    fn test_movements_need_both_dates() {
        let err = ReportRequest::try_from(&query(
            serde_json::json!({ "type": "movements", "startDate": "2024-03-01" }),
        ))
        .unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));

        let err = ReportRequest::try_from(&query(serde_json::json!({
            "type": "movements",
            "startDate": "2024-03-10",
            "endDate": "2024-03-01"
        })))
        .unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));

        let request = ReportRequest::try_from(&query(serde_json::json!({
            "type": "movements",
            "startDate": "2024-03-01",
            "endDate": "2024-03-01",
            "movementType": "OUT",
            "groupByProduct": true
        })))
        .unwrap();
        assert!(request.range.is_some());
        assert_eq!(request.movement_type, Some(MovementType::Out));
        assert!(request.group_by_product);
    }

    #[test]
    fn test_report_data_shapes() {
        let json = serde_json::to_value(ReportData::Products { products: vec![] }).unwrap();
        assert_eq!(json, serde_json::json!({ "products": [] }));

        let json = serde_json::to_value(ReportData::Grouped { movements: vec![] }).unwrap();
        assert_eq!(json, serde_json::json!({ "movements": [] }));
    }
}
