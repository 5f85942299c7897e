//! Product catalog handlers

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::handlers::category_filter;
use crate::middleware::CurrentUser;
use crate::services::products::{
    CreateProductInput, Product, ProductDetail, ProductFilter, ProductWithCategories, StockOverview,
    UpdateProductInput,
};
use crate::services::ProductService;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListQuery {
    pub search: Option<String>,
    #[serde(alias = "category")]
    pub category_id: Option<String>,
    #[serde(default)]
    pub include_inactive: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockQuery {
    pub search: Option<String>,
    pub category: Option<String>,
}

/// Status body; `isActive` is checked by hand so a non-boolean is a 400
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductStatusInput {
    #[serde(default)]
    pub is_active: serde_json::Value,
}

impl ProductStatusInput {
    fn flag(&self) -> AppResult<bool> {
        self.is_active.as_bool().ok_or_else(|| {
            AppError::invalid(
                "isActive",
                "isActive must be a boolean",
                "isActive debe ser un valor booleano",
            )
        })
    }
}

/// Response for list of products
#[derive(Serialize)]
pub struct ProductsResponse {
    pub products: Vec<ProductWithCategories>,
}

/// List products, active only unless `includeInactive=true`
pub async fn list_products(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ProductListQuery>,
) -> AppResult<Json<ProductsResponse>> {
    let filter = ProductFilter {
        search: query.search,
        category_id: category_filter(query.category_id.as_deref())?,
        include_inactive: query.include_inactive,
    };

    let service = ProductService::new(state.db.clone());
    let products = service.list_products(&filter).await?;

    Ok(Json(ProductsResponse { products }))
}

/// Get a single product
pub async fn get_product(
    State(state): State<AppState>,
    ApiPath(product_id): ApiPath<Uuid>,
) -> AppResult<Json<ProductDetail>> {
    let service = ProductService::new(state.db.clone());
    let product = service.get_product(product_id).await?;
    Ok(Json(product))
}

/// Create a new product
pub async fn create_product(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(input): ApiJson<CreateProductInput>,
) -> AppResult<(StatusCode, Json<ProductDetail>)> {
    input.validate()?;

    let service = ProductService::new(state.db.clone());
    let product = service.create_product(input).await?;

    tracing::debug!(user_id = %user.user_id, product_id = %product.product.id, "create product request served");

    Ok((StatusCode::CREATED, Json(product)))
}

/// Update a product and replace its categories
pub async fn update_product(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(product_id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<UpdateProductInput>,
) -> AppResult<Json<ProductDetail>> {
    input.validate()?;

    let service = ProductService::new(state.db.clone());
    let product = service.update_product(product_id, input).await?;

    tracing::debug!(user_id = %user.user_id, product_id = %product_id, "update product request served");

    Ok(Json(product))
}

/// Soft-delete a product
pub async fn delete_product(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(product_id): ApiPath<Uuid>,
) -> AppResult<Json<Product>> {
    let service = ProductService::new(state.db.clone());
    let product = service.set_active(product_id, false).await?;

    tracing::debug!(user_id = %user.user_id, product_id = %product_id, "product deactivated");

    Ok(Json(product))
}

/// Activate or deactivate a product
pub async fn set_product_status(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(product_id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<ProductStatusInput>,
) -> AppResult<Json<Product>> {
    let is_active = input.flag()?;

    let service = ProductService::new(state.db.clone());
    let product = service.set_active(product_id, is_active).await?;

    tracing::debug!(user_id = %user.user_id, product_id = %product_id, is_active, "product status request served");

    Ok(Json(product))
}

/// Stock overview of active products, lowest stock first
pub async fn get_stock(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<StockQuery>,
) -> AppResult<Json<StockOverview>> {
    let service = ProductService::new(state.db.clone());
    let overview = service
        .stock_overview(
            query.search.as_deref(),
            category_filter(query.category.as_deref())?,
        )
        .await?;

    Ok(Json(overview))
}
