use chrono::Utc;
use sqlx::SqliteConnection;

use crate::traits::SalesApiError;

/// Records a webhook delivery. Returns `false` if the delivery had already been recorded.
pub async fn record_delivery(
    delivery_id: &str,
    order_id: i64,
    conn: &mut SqliteConnection,
) -> Result<bool, SalesApiError> {
    let result =
        sqlx::query("INSERT OR IGNORE INTO webhook_deliveries (delivery_id, order_id, received_at) VALUES (?, ?, ?)")
            .bind(delivery_id)
            .bind(order_id)
            .bind(Utc::now())
            .execute(conn)
            .await?;
    Ok(result.rows_affected() == 1)
}

/// Adds `quantity` to the product's sales count in place. Returns `false` if no product has the given Shopify id.
pub async fn increment_sales_count(
    shopify_id: i64,
    quantity: i64,
    conn: &mut SqliteConnection,
) -> Result<bool, SalesApiError> {
    let result = sqlx::query("UPDATE products SET sales_count = sales_count + ?, updated_at = ? WHERE shopify_id = ?")
        .bind(quantity)
        .bind(Utc::now())
        .bind(shopify_id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected() > 0)
}
