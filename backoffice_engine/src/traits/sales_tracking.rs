use thiserror::Error;

use crate::db_types::{SalesOrder, SalesUpdate};

#[allow(async_fn_in_trait)]
pub trait SalesTracking {
    /// Adds each line item's quantity to the matching product's sales count.
    ///
    /// Implementations must apply the increments as atomic adds in the database, so that concurrent deliveries never
    /// lose updates. If the order carries a delivery id that has already been recorded, nothing is changed and
    /// [`SalesUpdate::DuplicateDelivery`] is returned.
    async fn apply_order_sales(&self, order: &SalesOrder) -> Result<SalesUpdate, SalesApiError>;
}

#[derive(Debug, Clone, Error)]
pub enum SalesApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Order {0} has no line items")]
    NoLineItems(i64),
    #[error("Invalid quantity {quantity} for product {product_id}")]
    InvalidQuantity { product_id: i64, quantity: i64 },
}

impl From<sqlx::Error> for SalesApiError {
    fn from(e: sqlx::Error) -> Self {
        SalesApiError::DatabaseError(e.to_string())
    }
}
