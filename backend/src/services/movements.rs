//! Stock ledger service: posting and listing movements

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::alerts::Alert;
use shared::ledger;
use shared::validation::parse_quantity;
use shared::{MovementType, PaginatedResponse};

/// Movement service
#[derive(Clone)]
pub struct MovementService {
    db: PgPool,
}

/// Movement record
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Movement {
    pub id: Uuid,
    #[serde(rename = "type")]
    #[sqlx(rename = "type", try_from = "String")]
    pub movement_type: MovementType,
    pub quantity: i32,
    pub description: String,
    pub date: DateTime<Utc>,
    pub product_id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Product fields embedded in a movement payload
#[derive(Debug, Clone, Serialize)]
pub struct MovementProduct {
    pub name: String,
    pub code: String,
    pub unit: String,
}

/// User fields embedded in a movement payload
#[derive(Debug, Clone, Serialize)]
pub struct MovementUser {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Movement with product and user details
#[derive(Debug, Serialize)]
pub struct MovementWithRelations {
    #[serde(flatten)]
    pub movement: Movement,
    pub product: MovementProduct,
    pub user: MovementUser,
}

/// Result of posting a movement
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostedMovement {
    #[serde(flatten)]
    pub movement: MovementWithRelations,
    pub previous_stock: i32,
    pub new_stock: i32,
    pub alert: Option<Alert>,
}

/// Raw movement body as sent by the client
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostMovementInput {
    pub product_id: Option<Uuid>,
    pub quantity: Option<serde_json::Number>,
    #[serde(rename = "type")]
    pub movement_type: Option<String>,
    pub description: Option<String>,
    pub date: Option<DateTime<Utc>>,
}

/// Movement validated and ready to post
#[derive(Debug, Clone, PartialEq)]
pub struct NewMovement {
    pub product_id: Uuid,
    pub movement_type: MovementType,
    pub quantity: i32,
    pub description: String,
    pub date: Option<DateTime<Utc>>,
}

impl TryFrom<PostMovementInput> for NewMovement {
    type Error = AppError;

    fn try_from(input: PostMovementInput) -> Result<Self, Self::Error> {
        let product_id = input.product_id.ok_or_else(|| {
            AppError::invalid("productId", "Product is required", "El producto es obligatorio")
        })?;

        let movement_type = input
            .movement_type
            .ok_or_else(|| AppError::invalid("type", "Type is required", "El tipo es obligatorio"))?
            .parse::<MovementType>()
            .map_err(|_| {
                AppError::invalid("type", "Type must be IN or OUT", "El tipo debe ser IN u OUT")
            })?;

        let quantity = input.quantity.as_ref().ok_or_else(|| {
            AppError::invalid("quantity", "Quantity is required", "La cantidad es obligatoria")
        })?;
        let quantity = parse_quantity(quantity).map_err(|msg| {
            AppError::invalid(
                "quantity",
                msg,
                "La cantidad debe ser un número entero positivo",
            )
        })?;

        Ok(NewMovement {
            product_id,
            movement_type,
            quantity,
            description: input.description.map(|d| d.trim().to_string()).unwrap_or_default(),
            date: input.date,
        })
    }
}

/// Movement listing filters
#[derive(Debug, Default, Clone, Copy)]
pub struct MovementFilter {
    pub product_id: Option<Uuid>,
    pub movement_type: Option<MovementType>,
}

#[derive(FromRow)]
struct LockedProduct {
    name: String,
    code: String,
    unit: String,
    current_stock: i32,
    min_stock: i32,
}

#[derive(FromRow)]
struct MovementRow {
    #[sqlx(flatten)]
    movement: Movement,
    product_name: String,
    product_code: String,
    product_unit: String,
    user_name: Option<String>,
    user_email: Option<String>,
}

impl From<MovementRow> for MovementWithRelations {
    fn from(row: MovementRow) -> Self {
        MovementWithRelations {
            movement: row.movement,
            product: MovementProduct {
                name: row.product_name,
                code: row.product_code,
                unit: row.product_unit,
            },
            user: MovementUser {
                name: row.user_name,
                email: row.user_email,
            },
        }
    }
}

impl MovementService {
    /// Create a new MovementService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Post a movement: update the product's stock and raise an alert when
    /// an outgoing movement leaves it low or empty, all in one transaction.
    pub async fn post_movement(&self, user_id: Uuid, input: NewMovement) -> AppResult<PostedMovement> {
        let mut tx = self.db.begin().await?;

        // Resolve the acting user
        let user = sqlx::query_as::<_, (Option<String>, Option<String>)>(
            "SELECT name, email FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))?;

        // Lock the product row so concurrent postings serialize on it
        let product = sqlx::query_as::<_, LockedProduct>(
            r#"
            SELECT name, code, unit, current_stock, min_stock
            FROM products
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(input.product_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        let posting = ledger::post(
            product.current_stock,
            product.min_stock,
            input.movement_type,
            input.quantity,
        )?;

        let movement = sqlx::query_as::<_, Movement>(
            r#"
            INSERT INTO movements (type, quantity, description, date, product_id, user_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, type, quantity, description, date, product_id, user_id, created_at
            "#,
        )
        .bind(input.movement_type.as_str())
        .bind(input.quantity)
        .bind(&input.description)
        .bind(input.date.unwrap_or_else(Utc::now))
        .bind(input.product_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE products SET current_stock = $1, updated_at = NOW() WHERE id = $2")
            .bind(posting.new_stock)
            .bind(input.product_id)
            .execute(&mut *tx)
            .await?;

        let alert = match posting.alert {
            Some(kind) => {
                let alert = sqlx::query_as::<_, Alert>(
                    r#"
                    INSERT INTO alerts (type, message, product_id)
                    VALUES ($1, $2, $3)
                    RETURNING id, type, message, product_id, created_at
                    "#,
                )
                .bind(kind.as_str())
                .bind(kind.message(&product.name, posting.new_stock))
                .bind(input.product_id)
                .fetch_one(&mut *tx)
                .await?;
                Some(alert)
            }
            None => None,
        };

        tx.commit().await?;

        tracing::info!(
            movement_id = %movement.id,
            product_id = %input.product_id,
            user_id = %user_id,
            movement_type = %input.movement_type,
            quantity = input.quantity,
            previous_stock = posting.previous_stock,
            new_stock = posting.new_stock,
            "movement posted"
        );
        if let Some(ref alert) = alert {
            tracing::warn!(product_id = %input.product_id, alert_type = %alert.kind, "{}", alert.message);
        }

        Ok(PostedMovement {
            movement: MovementWithRelations {
                movement,
                product: MovementProduct {
                    name: product.name,
                    code: product.code,
                    unit: product.unit,
                },
                user: MovementUser {
                    name: user.0,
                    email: user.1,
                },
            },
            previous_stock: posting.previous_stock,
            new_stock: posting.new_stock,
            alert,
        })
    }

    /// Most recent movements first, with product and user details
    pub async fn list_movements(
        &self,
        filter: MovementFilter,
        limit: i64,
        offset: i64,
    ) -> AppResult<PaginatedResponse<MovementWithRelations>> {
        let movement_type = filter.movement_type.map(|t| t.as_str());

        let rows = sqlx::query_as::<_, MovementRow>(
            r#"
            SELECT m.id, m.type, m.quantity, m.description, m.date, m.product_id, m.user_id,
                   m.created_at,
                   p.name AS product_name, p.code AS product_code, p.unit AS product_unit,
                   u.name AS user_name, u.email AS user_email
            FROM movements m
            JOIN products p ON p.id = m.product_id
            JOIN users u ON u.id = m.user_id
            WHERE ($1::uuid IS NULL OR m.product_id = $1)
              AND ($2::text IS NULL OR m.type = $2)
            ORDER BY m.created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(filter.product_id)
        .bind(movement_type)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM movements m
            WHERE ($1::uuid IS NULL OR m.product_id = $1)
              AND ($2::text IS NULL OR m.type = $2)
            "#,
        )
        .bind(filter.product_id)
        .bind(movement_type)
        .fetch_one(&self.db)
        .await?;

        let data = rows.into_iter().map(MovementWithRelations::from).collect();

        Ok(PaginatedResponse::new(data, total, limit, offset))
    }
}
