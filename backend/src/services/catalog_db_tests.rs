//! Catalog round trips against PostgreSQL
//!
//! Run with `DATABASE_URL` pointing at a scratch database; the tests return
//! early when it is unset. Every row they create uses a unique suffix and is
//! removed afterwards.

use std::collections::BTreeSet;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;
use crate::services::categories::CategoryInput;
use crate::services::products::{CreateProductInput, ProductDetail, UpdateProductInput};
use crate::services::{CategoryService, ProductService};

async fn database() -> Option<PgPool> {
    let url = std::env::var("DATABASE_URL").ok()?;
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&url)
        .await
        .unwrap();
    sqlx::migrate!("./migrations").run(&pool).await.unwrap();
    Some(pool)
}

fn suffix() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

async fn category(service: &CategoryService, name: &str) -> Uuid {
    service
        .create_category(CategoryInput {
            name: format!("{} {}", name, suffix()),
            description: None,
        })
        .await
        .unwrap()
        .id
}

async fn product(service: &ProductService, name: &str, category_ids: Vec<Uuid>) -> ProductDetail {
    service
        .create_product(CreateProductInput {
            code: format!("T-{}", suffix()),
            name: name.to_string(),
            description: None,
            unit: None,
            min_stock: Some(5),
            category_ids,
        })
        .await
        .unwrap()
}

fn update(detail: &ProductDetail, category_ids: Option<Vec<Uuid>>) -> UpdateProductInput {
    UpdateProductInput {
        code: detail.product.code.clone(),
        name: detail.product.name.clone(),
        description: None,
        unit: None,
        min_stock: None,
        category_ids,
    }
}

fn category_set(detail: &ProductDetail) -> BTreeSet<Uuid> {
    detail.categories.iter().map(|c| c.id).collect()
}

async fn cleanup(pool: &PgPool, products: &[Uuid], categories: &[Uuid]) {
    sqlx::query("DELETE FROM products WHERE id = ANY($1)")
        .bind(products)
        .execute(pool)
        .await
        .unwrap();
    sqlx::query("DELETE FROM categories WHERE id = ANY($1)")
        .bind(categories)
        .execute(pool)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_category_set_round_trip_and_replace() {
    let Some(pool) = database().await else {
        return;
    };
    let categories = CategoryService::new(pool.clone());
    let products = ProductService::new(pool.clone());

    let a = category(&categories, "Ferretería").await;
    let b = category(&categories, "Tools").await;
    let c = category(&categories, "Jardín").await;

    let created = product(&products, "Tornillo", vec![b, a, b]).await;
    assert_eq!(created.product.current_stock, 0);
    assert_eq!(created.product.unit, "unidad");

    let read = products.get_product(created.product.id).await.unwrap();
    assert_eq!(category_set(&read), BTreeSet::from([a, b]));

    let updated = products
        .update_product(created.product.id, update(&read, Some(vec![c])))
        .await
        .unwrap();
    assert_eq!(category_set(&updated), BTreeSet::from([c]));

    // no categoryIds leaves the stored set alone
    let kept = products
        .update_product(created.product.id, update(&updated, None))
        .await
        .unwrap();
    assert_eq!(category_set(&kept), BTreeSet::from([c]));
    assert_eq!(kept.product.min_stock, 5);

    let cleared = products
        .update_product(created.product.id, update(&kept, Some(vec![])))
        .await
        .unwrap();
    assert!(cleared.categories.is_empty());

    let unknown = products
        .update_product(created.product.id, update(&cleared, Some(vec![Uuid::new_v4()])))
        .await;
    assert!(matches!(unknown, Err(AppError::NotFound(_))));

    cleanup(&pool, &[created.product.id], &[a, b, c]).await;
}

#[tokio::test]
async fn test_tools_category_delete_scenario() {
    let Some(pool) = database().await else {
        return;
    };
    let categories = CategoryService::new(pool.clone());
    let products = ProductService::new(pool.clone());

    let tools = category(&categories, "Tools").await;
    let hammer = product(&products, "Martillo", vec![tools]).await;
    let saw = product(&products, "Sierra", vec![tools]).await;

    let listed = categories.list_categories().await.unwrap();
    let count = listed
        .iter()
        .find(|c| c.category.id == tools)
        .map(|c| c.product_count);
    assert_eq!(count, Some(2));

    assert!(matches!(
        categories.delete_category(tools).await,
        Err(AppError::Conflict { .. })
    ));

    products
        .update_product(hammer.product.id, update(&hammer, Some(vec![])))
        .await
        .unwrap();
    assert!(matches!(
        categories.delete_category(tools).await,
        Err(AppError::Conflict { .. })
    ));

    products
        .update_product(saw.product.id, update(&saw, Some(vec![])))
        .await
        .unwrap();
    categories.delete_category(tools).await.unwrap();

    assert!(matches!(
        categories.delete_category(tools).await,
        Err(AppError::NotFound(_))
    ));

    cleanup(&pool, &[hammer.product.id, saw.product.id], &[]).await;
}

#[tokio::test]
async fn test_category_update_without_description_clears_it() {
    let Some(pool) = database().await else {
        return;
    };
    let categories = CategoryService::new(pool.clone());

    let name = format!("Pintura {}", suffix());
    let created = categories
        .create_category(CategoryInput {
            name: name.clone(),
            description: Some("  Esmaltes y barnices ".into()),
        })
        .await
        .unwrap();
    assert_eq!(created.description, "Esmaltes y barnices");

    let updated = categories
        .update_category(
            created.id,
            CategoryInput {
                name,
                description: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.description, "");

    cleanup(&pool, &[], &[created.id]).await;
}
