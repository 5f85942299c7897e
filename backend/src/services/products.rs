//! Product catalog service: products, their category links and stock listing

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use shared::ledger::is_low_stock;
use shared::validation::{
    normalize_category_ids, validate_min_stock, validate_name, validate_product_code,
};

/// Default unit label for new products
pub const DEFAULT_UNIT: &str = "unidad";

/// Product service for catalog maintenance
#[derive(Clone)]
pub struct ProductService {
    db: PgPool,
}

/// Product record
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub description: String,
    pub unit: String,
    pub min_stock: i32,
    pub current_stock: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Category reference embedded in product payloads
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CategoryRef {
    pub id: Uuid,
    pub name: String,
}

#[derive(sqlx::FromRow)]
struct CategoryLink {
    product_id: Uuid,
    id: Uuid,
    name: String,
}

/// Product with its categories
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductWithCategories {
    #[serde(flatten)]
    pub product: Product,
    pub categories: Vec<CategoryRef>,
}

/// Product with categories and history size
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub categories: Vec<CategoryRef>,
    pub movement_count: i64,
}

/// Product line of the stock overview
#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StockProduct {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub description: String,
    pub unit: String,
    pub current_stock: i32,
    pub min_stock: i32,
    pub movement_count: i64,
    pub categories: Vec<String>,
    #[sqlx(skip)]
    pub is_low: bool,
}

/// Stock overview with the categories available as filters
#[derive(Debug, Serialize)]
pub struct StockOverview {
    pub products: Vec<StockProduct>,
    pub categories: Vec<CategoryRef>,
}

/// Product listing filters
#[derive(Debug, Default, Clone)]
pub struct ProductFilter {
    pub search: Option<String>,
    pub category_id: Option<Uuid>,
    pub include_inactive: bool,
}

// validator's derive passes `Option<i32>` fields by value; delegate to the
// shared by-reference validator.
fn validate_min_stock_value(min_stock: i32) -> Result<(), validator::ValidationError> {
    validate_min_stock(&min_stock)
}

/// Input for creating a product
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductInput {
    #[validate(custom = "validate_product_code")]
    pub code: String,
    #[validate(custom = "validate_name")]
    pub name: String,
    pub description: Option<String>,
    pub unit: Option<String>,
    #[validate(custom = "validate_min_stock_value")]
    pub min_stock: Option<i32>,
    #[serde(default)]
    pub category_ids: Vec<Uuid>,
}

/// Input for updating a product
///
/// `code` and `name` are always required. Omitted optional fields keep
/// their stored value; a present `categoryIds` replaces the whole set.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductInput {
    #[validate(custom = "validate_product_code")]
    pub code: String,
    #[validate(custom = "validate_name")]
    pub name: String,
    pub description: Option<String>,
    pub unit: Option<String>,
    #[validate(custom = "validate_min_stock_value")]
    pub min_stock: Option<i32>,
    pub category_ids: Option<Vec<Uuid>>,
}

const PRODUCT_COLUMNS: &str = "id, code, name, description, unit, min_stock, current_stock, is_active, created_at, updated_at";

impl ProductService {
    /// Create a new ProductService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List products ordered by name
    pub async fn list_products(&self, filter: &ProductFilter) -> AppResult<Vec<ProductWithCategories>> {
        let pattern = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(like_pattern);

        let products = sqlx::query_as::<_, Product>(&format!(
            r#"
            SELECT {PRODUCT_COLUMNS}
            FROM products p
            WHERE ($1 OR p.is_active)
              AND ($2::text IS NULL
                   OR p.code ILIKE $2
                   OR p.name ILIKE $2
                   OR p.description ILIKE $2)
              AND ($3::uuid IS NULL OR EXISTS (
                   SELECT 1 FROM product_categories pc
                   WHERE pc.product_id = p.id AND pc.category_id = $3))
            ORDER BY p.name ASC
            "#
        ))
        .bind(filter.include_inactive)
        .bind(pattern)
        .bind(filter.category_id)
        .fetch_all(&self.db)
        .await?;

        let ids: Vec<Uuid> = products.iter().map(|p| p.id).collect();
        let mut links = self.categories_by_product(&ids).await?;

        Ok(products
            .into_iter()
            .map(|product| {
                let categories = links.remove(&product.id).unwrap_or_default();
                ProductWithCategories { product, categories }
            })
            .collect())
    }

    /// Get a product with its categories and movement count
    pub async fn get_product(&self, product_id: Uuid) -> AppResult<ProductDetail> {
        let product = self.find_product(product_id).await?;

        let categories = self
            .categories_by_product(&[product_id])
            .await?
            .remove(&product_id)
            .unwrap_or_default();

        let movement_count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM movements WHERE product_id = $1")
                .bind(product_id)
                .fetch_one(&self.db)
                .await?;

        Ok(ProductDetail {
            product,
            categories,
            movement_count,
        })
    }

    /// Create a product with zero stock
    pub async fn create_product(&self, input: CreateProductInput) -> AppResult<ProductDetail> {
        let code = input.code.trim().to_string();
        let name = input.name.trim().to_string();

        self.ensure_code_available(&code, None).await?;

        let category_ids = normalize_category_ids(&input.category_ids);
        self.ensure_categories_exist(&category_ids).await?;

        let mut tx = self.db.begin().await?;

        let product_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO products (code, name, description, unit, min_stock, current_stock)
            VALUES ($1, $2, $3, $4, $5, 0)
            RETURNING id
            "#,
        )
        .bind(&code)
        .bind(&name)
        .bind(input.description.as_deref().map(str::trim).unwrap_or_default())
        .bind(unit_or_default(input.unit.as_deref()))
        .bind(input.min_stock.unwrap_or(0))
        .fetch_one(&mut *tx)
        .await?;

        replace_categories(&mut tx, product_id, &category_ids).await?;

        tx.commit().await?;

        tracing::info!(product_id = %product_id, code = %code, "product created");

        self.get_product(product_id).await
    }

    /// Update a product; a supplied category set replaces the stored one
    pub async fn update_product(
        &self,
        product_id: Uuid,
        input: UpdateProductInput,
    ) -> AppResult<ProductDetail> {
        let existing = self.find_product(product_id).await?;

        let code = input.code.trim().to_string();
        let name = input.name.trim().to_string();
        let min_stock = input.min_stock.unwrap_or(existing.min_stock);

        self.ensure_code_available(&code, Some(product_id)).await?;

        let category_ids = input.category_ids.as_deref().map(normalize_category_ids);
        if let Some(ref ids) = category_ids {
            self.ensure_categories_exist(ids).await?;
        }

        let description = input
            .description
            .map(|d| d.trim().to_string())
            .unwrap_or(existing.description);
        let unit = match input.unit {
            Some(unit) => unit_or_default(Some(&unit)),
            None => existing.unit,
        };

        let mut tx = self.db.begin().await?;

        sqlx::query(
            r#"
            UPDATE products
            SET code = $1, name = $2, description = $3, unit = $4, min_stock = $5, updated_at = NOW()
            WHERE id = $6
            "#,
        )
        .bind(&code)
        .bind(&name)
        .bind(&description)
        .bind(&unit)
        .bind(min_stock)
        .bind(product_id)
        .execute(&mut *tx)
        .await?;

        if let Some(ids) = category_ids {
            replace_categories(&mut tx, product_id, &ids).await?;
        }

        tx.commit().await?;

        tracing::info!(product_id = %product_id, code = %code, "product updated");

        self.get_product(product_id).await
    }

    /// Activate or deactivate a product; history is untouched
    pub async fn set_active(&self, product_id: Uuid, is_active: bool) -> AppResult<Product> {
        let product = sqlx::query_as::<_, Product>(&format!(
            r#"
            UPDATE products SET is_active = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(is_active)
        .bind(product_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        tracing::info!(product_id = %product_id, is_active, "product status changed");

        Ok(product)
    }

    /// Active products for the stock overview, lowest stock first
    pub async fn stock_overview(
        &self,
        search: Option<&str>,
        category_id: Option<Uuid>,
    ) -> AppResult<StockOverview> {
        let pattern = search.map(str::trim).filter(|s| !s.is_empty()).map(like_pattern);

        let mut products = sqlx::query_as::<_, StockProduct>(
            r#"
            SELECT p.id, p.code, p.name, p.description, p.unit, p.current_stock, p.min_stock,
                   (SELECT COUNT(*) FROM movements m WHERE m.product_id = p.id) AS movement_count,
                   ARRAY(
                       SELECT c.name FROM product_categories pc
                       JOIN categories c ON c.id = pc.category_id
                       WHERE pc.product_id = p.id
                       ORDER BY c.name
                   ) AS categories
            FROM products p
            WHERE p.is_active
              AND ($1::text IS NULL
                   OR p.code ILIKE $1
                   OR p.name ILIKE $1
                   OR p.description ILIKE $1)
              AND ($2::uuid IS NULL OR EXISTS (
                   SELECT 1 FROM product_categories pc
                   WHERE pc.product_id = p.id AND pc.category_id = $2))
            ORDER BY p.current_stock ASC, p.name ASC
            "#,
        )
        .bind(pattern)
        .bind(category_id)
        .fetch_all(&self.db)
        .await?;

        for product in &mut products {
            product.is_low = is_low_stock(product.current_stock, product.min_stock);
        }

        let categories =
            sqlx::query_as::<_, CategoryRef>("SELECT id, name FROM categories ORDER BY name ASC")
                .fetch_all(&self.db)
                .await?;

        Ok(StockOverview {
            products,
            categories,
        })
    }

    async fn find_product(&self, product_id: Uuid) -> AppResult<Product> {
        sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(product_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))
    }

    async fn categories_by_product(
        &self,
        product_ids: &[Uuid],
    ) -> AppResult<HashMap<Uuid, Vec<CategoryRef>>> {
        if product_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let links = sqlx::query_as::<_, CategoryLink>(
            r#"
            SELECT pc.product_id, c.id, c.name
            FROM product_categories pc
            JOIN categories c ON c.id = pc.category_id
            WHERE pc.product_id = ANY($1)
            ORDER BY c.name ASC
            "#,
        )
        .bind(product_ids)
        .fetch_all(&self.db)
        .await?;

        let mut grouped: HashMap<Uuid, Vec<CategoryRef>> = HashMap::new();
        for link in links {
            grouped.entry(link.product_id).or_default().push(CategoryRef {
                id: link.id,
                name: link.name,
            });
        }
        Ok(grouped)
    }

    async fn ensure_code_available(&self, code: &str, exclude: Option<Uuid>) -> AppResult<()> {
        let existing = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM products WHERE code = $1 AND ($2::uuid IS NULL OR id <> $2)",
        )
        .bind(code)
        .bind(exclude)
        .fetch_one(&self.db)
        .await?;

        if existing > 0 {
            return Err(AppError::DuplicateEntry("code".to_string()));
        }
        Ok(())
    }

    async fn ensure_categories_exist(&self, category_ids: &[Uuid]) -> AppResult<()> {
        if category_ids.is_empty() {
            return Ok(());
        }

        let valid_count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM categories WHERE id = ANY($1)")
                .bind(category_ids)
                .fetch_one(&self.db)
                .await?;

        if valid_count != category_ids.len() as i64 {
            return Err(AppError::NotFound("Category".to_string()));
        }
        Ok(())
    }
}

/// Delete every category link of a product and insert the given set
async fn replace_categories(
    tx: &mut Transaction<'_, Postgres>,
    product_id: Uuid,
    category_ids: &[Uuid],
) -> AppResult<()> {
    sqlx::query("DELETE FROM product_categories WHERE product_id = $1")
        .bind(product_id)
        .execute(&mut **tx)
        .await?;

    for category_id in category_ids {
        sqlx::query("INSERT INTO product_categories (product_id, category_id) VALUES ($1, $2)")
            .bind(product_id)
            .bind(category_id)
            .execute(&mut **tx)
            .await?;
    }

    Ok(())
}

fn unit_or_default(unit: Option<&str>) -> String {
    match unit.map(str::trim) {
        Some(unit) if !unit.is_empty() => unit.to_string(),
        _ => DEFAULT_UNIT.to_string(),
    }
}

/// Case-insensitive substring pattern with LIKE wildcards escaped
pub(crate) fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("tor"), "%tor%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }

    #[test]
    fn test_unit_defaults() {
        assert_eq!(unit_or_default(None), "unidad");
        assert_eq!(unit_or_default(Some("  ")), "unidad");
        assert_eq!(unit_or_default(Some(" kg ")), "kg");
    }

    #[test]
    fn test_blank_code_rejected_after_trim() {
        let input: CreateProductInput = serde_json::from_value(serde_json::json!({
            "code": "   ",
            "name": "Tornillo"
        }))
        .unwrap();
        match AppError::from(input.validate().unwrap_err()) {
            AppError::Validation {
                field,
                message,
                message_es,
            } => {
                assert_eq!(field, "code");
                assert_eq!(message, "Code is required");
                assert_eq!(message_es, "El código es obligatorio");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_negative_min_stock_names_camel_case_field() {
        let input: UpdateProductInput = serde_json::from_value(serde_json::json!({
            "code": "T-1",
            "name": "Tornillo",
            "minStock": -1
        }))
        .unwrap();
        match AppError::from(input.validate().unwrap_err()) {
            AppError::Validation { field, .. } => assert_eq!(field, "minStock"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_create_input_validation() {
        let input: CreateProductInput = serde_json::from_value(serde_json::json!({
            "code": "T-1",
            "name": "Tornillo",
            "minStock": -3
        }))
        .unwrap();
        assert!(input.validate().is_err());
        assert!(input.category_ids.is_empty());
    }
}
