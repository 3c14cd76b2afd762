use thiserror::Error;

use crate::db_types::{NewProduct, Product, ProductWithCreator};

#[allow(async_fn_in_trait)]
pub trait ProductManagement {
    async fn insert_product(&self, product: NewProduct) -> Result<Product, ProductApiError>;

    /// Every product, oldest first, joined with the name and email of the user that created it.
    async fn fetch_all_products(&self) -> Result<Vec<ProductWithCreator>, ProductApiError>;

    /// The products created by the given user, oldest first.
    async fn fetch_products_for_user(&self, user_id: i64) -> Result<Vec<Product>, ProductApiError>;

    /// The products created by the given user, ordered by sales count, best sellers first.
    async fn fetch_bestsellers_for_user(&self, user_id: i64) -> Result<Vec<Product>, ProductApiError>;
}

#[derive(Debug, Clone, Error)]
pub enum ProductApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("A product with Shopify id {0} already exists")]
    ProductAlreadyExists(i64),
    #[error("Invalid input. {0}")]
    InvalidInput(String),
}

impl From<sqlx::Error> for ProductApiError {
    fn from(e: sqlx::Error) -> Self {
        ProductApiError::DatabaseError(e.to_string())
    }
}
