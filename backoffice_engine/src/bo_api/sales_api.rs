use std::fmt::Debug;

use log::info;

use crate::{
    db_types::{SalesOrder, SalesUpdate},
    traits::{SalesApiError, SalesTracking},
};

#[derive(Clone)]
pub struct SalesApi<B> {
    db: B,
}

impl<B: Debug> Debug for SalesApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SalesApi ({:?})", self.db)
    }
}

impl<B> SalesApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> SalesApi<B>
where B: SalesTracking
{
    /// Adds the quantities of a paid order to the sales counts of the products it contains.
    pub async fn record_sales(&self, order: &SalesOrder) -> Result<SalesUpdate, SalesApiError> {
        if order.line_items.is_empty() {
            return Err(SalesApiError::NoLineItems(order.order_id));
        }
        if let Some(item) = order.line_items.iter().find(|i| i.quantity < 0) {
            return Err(SalesApiError::InvalidQuantity { product_id: item.product_id, quantity: item.quantity });
        }
        let update = self.db.apply_order_sales(order).await?;
        if let SalesUpdate::Applied { products_updated, products_not_found } = update {
            info!(
                "🛍️️ Order {}: sales counts updated for {products_updated} products, {products_not_found} not found",
                order.order_id
            );
        }
        Ok(update)
    }
}
