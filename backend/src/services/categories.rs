//! Category catalog service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use shared::validation::{check_category_deletable, validate_name};

/// Category service
#[derive(Clone)]
pub struct CategoryService {
    db: PgPool,
}

/// Category record
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Category with the number of products linked to it
#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CategoryWithCount {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub category: Category,
    pub product_count: i64,
}

/// Input for creating or updating a category
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInput {
    #[validate(custom = "validate_name")]
    pub name: String,
    pub description: Option<String>,
}

impl CategoryService {
    /// Create a new CategoryService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// All categories ordered by name, with product counts
    pub async fn list_categories(&self) -> AppResult<Vec<CategoryWithCount>> {
        let categories = sqlx::query_as::<_, CategoryWithCount>(
            r#"
            SELECT c.id, c.name, c.description, c.created_at, c.updated_at,
                   COUNT(pc.product_id) AS product_count
            FROM categories c
            LEFT JOIN product_categories pc ON pc.category_id = c.id
            GROUP BY c.id
            ORDER BY c.name ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(categories)
    }

    /// Create a category with a unique name
    pub async fn create_category(&self, input: CategoryInput) -> AppResult<Category> {
        let name = input.name.trim().to_string();
        self.ensure_name_available(&name, None).await?;

        let category = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (name, description)
            VALUES ($1, $2)
            RETURNING id, name, description, created_at, updated_at
            "#,
        )
        .bind(&name)
        .bind(input.description.as_deref().map(str::trim).unwrap_or_default())
        .fetch_one(&self.db)
        .await?;

        tracing::info!(category_id = %category.id, name = %category.name, "category created");

        Ok(category)
    }

    /// Rename or re-describe a category; an absent description clears it
    pub async fn update_category(&self, category_id: Uuid, input: CategoryInput) -> AppResult<Category> {
        let name = input.name.trim().to_string();
        self.ensure_exists(category_id).await?;
        self.ensure_name_available(&name, Some(category_id)).await?;

        let category = sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories
            SET name = $1, description = $2, updated_at = NOW()
            WHERE id = $3
            RETURNING id, name, description, created_at, updated_at
            "#,
        )
        .bind(&name)
        .bind(input.description.as_deref().map(str::trim).unwrap_or_default())
        .bind(category_id)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(category_id = %category.id, name = %category.name, "category updated");

        Ok(category)
    }

    /// Delete a category that no product links to
    pub async fn delete_category(&self, category_id: Uuid) -> AppResult<()> {
        self.ensure_exists(category_id).await?;

        let linked = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM product_categories WHERE category_id = $1",
        )
        .bind(category_id)
        .fetch_one(&self.db)
        .await?;

        check_category_deletable(linked).map_err(|msg| AppError::Conflict {
            resource: "category".to_string(),
            message: msg.to_string(),
            message_es: "No se puede eliminar una categoría con productos asignados".to_string(),
        })?;

        sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(category_id)
            .execute(&self.db)
            .await?;

        tracing::info!(category_id = %category_id, "category deleted");

        Ok(())
    }

    async fn ensure_exists(&self, category_id: Uuid) -> AppResult<()> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1)")
                .bind(category_id)
                .fetch_one(&self.db)
                .await?;

        if !exists {
            return Err(AppError::NotFound("Category".to_string()));
        }
        Ok(())
    }

    async fn ensure_name_available(&self, name: &str, exclude: Option<Uuid>) -> AppResult<()> {
        let existing = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM categories WHERE name = $1 AND ($2::uuid IS NULL OR id <> $2)",
        )
        .bind(name)
        .bind(exclude)
        .fetch_one(&self.db)
        .await?;

        if existing > 0 {
            return Err(AppError::DuplicateEntry("name".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitespace_name_rejected() {
        let input: CategoryInput =
            serde_json::from_value(serde_json::json!({ "name": "  " })).unwrap();
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_input_accepts_missing_description() {
        let input: CategoryInput =
            serde_json::from_value(serde_json::json!({ "name": "Tools" })).unwrap();
        assert!(input.validate().is_ok());
        assert!(input.description.is_none());
    }
}
