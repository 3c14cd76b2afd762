use std::fmt::Debug;

use log::info;

use crate::{
    db_types::{NewProduct, Product, ProductWithCreator},
    traits::{ProductApiError, ProductManagement},
};

/// Manages the local mirror of products that were created on the storefront.
#[derive(Clone)]
pub struct ProductApi<B> {
    db: B,
}

impl<B: Debug> Debug for ProductApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ProductApi ({:?})", self.db)
    }
}

impl<B> ProductApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> ProductApi<B>
where B: ProductManagement
{
    /// Records a product that now exists on the storefront under `shopify_id`.
    pub async fn register_product(&self, shopify_id: i64, created_by: i64) -> Result<Product, ProductApiError> {
        if shopify_id <= 0 {
            return Err(ProductApiError::InvalidInput(format!("{shopify_id} is not a valid Shopify product id")));
        }
        let product = self.db.insert_product(NewProduct::new(shopify_id, created_by)).await?;
        info!("🛍️️ Product #{} (Shopify id {shopify_id}) created by user #{created_by}", product.id);
        Ok(product)
    }

    pub async fn all_products(&self) -> Result<Vec<ProductWithCreator>, ProductApiError> {
        self.db.fetch_all_products().await
    }

    pub async fn products_for_user(&self, user_id: i64) -> Result<Vec<Product>, ProductApiError> {
        self.db.fetch_products_for_user(user_id).await
    }

    pub async fn bestsellers_for_user(&self, user_id: i64) -> Result<Vec<Product>, ProductApiError> {
        self.db.fetch_bestsellers_for_user(user_id).await
    }
}
