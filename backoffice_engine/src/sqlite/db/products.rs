use chrono::Utc;
use log::debug;
use sqlx::SqliteConnection;

use super::is_unique_violation;
use crate::{
    db_types::{NewProduct, Product, ProductWithCreator},
    traits::ProductApiError,
};

pub async fn insert_product(product: NewProduct, conn: &mut SqliteConnection) -> Result<Product, ProductApiError> {
    let now = Utc::now();
    let result = sqlx::query_as::<_, Product>(
        r#"INSERT INTO products (shopify_id, created_by, image_url, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?)
        RETURNING *"#,
    )
    .bind(product.shopify_id)
    .bind(product.created_by)
    .bind(&product.image_url)
    .bind(now)
    .bind(now)
    .fetch_one(conn)
    .await;
    match result {
        Ok(p) => {
            debug!("🗃️ Inserted product #{} (Shopify id {})", p.id, p.shopify_id);
            Ok(p)
        },
        Err(e) if is_unique_violation(&e) => Err(ProductApiError::ProductAlreadyExists(product.shopify_id)),
        Err(e) => Err(e.into()),
    }
}

pub async fn fetch_all_with_creators(conn: &mut SqliteConnection) -> Result<Vec<ProductWithCreator>, ProductApiError> {
    let products = sqlx::query_as::<_, ProductWithCreator>(
        r#"SELECT
            products.id,
            products.shopify_id,
            products.created_by,
            products.sales_count,
            products.created_at,
            users.name AS creator_name,
            users.email AS creator_email
        FROM products LEFT JOIN users ON products.created_by = users.id
        ORDER BY products.created_at ASC, products.id ASC"#,
    )
    .fetch_all(conn)
    .await?;
    Ok(products)
}

pub async fn fetch_for_user(user_id: i64, conn: &mut SqliteConnection) -> Result<Vec<Product>, ProductApiError> {
    let products =
        sqlx::query_as::<_, Product>("SELECT * FROM products WHERE created_by = ? ORDER BY created_at ASC, id ASC")
            .bind(user_id)
            .fetch_all(conn)
            .await?;
    Ok(products)
}

pub async fn fetch_bestsellers_for_user(
    user_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<Product>, ProductApiError> {
    let products = sqlx::query_as::<_, Product>(
        "SELECT * FROM products WHERE created_by = ? ORDER BY sales_count DESC, created_at ASC, id ASC",
    )
    .bind(user_id)
    .fetch_all(conn)
    .await?;
    Ok(products)
}
