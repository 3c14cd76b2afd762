//! `SqliteDatabase` is a concrete implementation of a back-office engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the [`crate::traits`]
//! module.
use std::fmt::Debug;

use chrono::{DateTime, Utc};
use log::*;
use sqlx::SqlitePool;

use super::db::{api_keys, db_url, new_pool, products, roles, sales, users};
use crate::{
    db_types::{
        ApiKey,
        ApiKeySummary,
        NewApiKey,
        NewProduct,
        NewUser,
        Product,
        ProductWithCreator,
        Role,
        SalesOrder,
        SalesUpdate,
        User,
        UserProfile,
    },
    traits::{
        ApiKeyApiError,
        ApiKeyManagement,
        AuthApiError,
        AuthManagement,
        ProductApiError,
        ProductManagement,
        SalesApiError,
        SalesTracking,
        UserApiError,
        UserManagement,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SqliteDatabase ({})", self.url)
    }
}

impl AuthManagement for SqliteDatabase {
    async fn fetch_user_by_id(&self, user_id: i64) -> Result<Option<User>, AuthApiError> {
        let mut conn = self.pool.acquire().await?;
        users::fetch_user_by_id(user_id, &mut conn).await
    }

    async fn fetch_user_by_email(&self, email: &str) -> Result<Option<User>, AuthApiError> {
        let mut conn = self.pool.acquire().await?;
        users::fetch_user_by_email(email, &mut conn).await
    }

    async fn fetch_role_by_id(&self, role_id: i64) -> Result<Option<Role>, AuthApiError> {
        let mut conn = self.pool.acquire().await?;
        roles::fetch_role_by_id(role_id, &mut conn).await
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, AuthApiError> {
        let mut tx = self.pool.begin().await?;
        let user = users::insert_user(user, &mut tx).await?;
        tx.commit().await?;
        Ok(user)
    }

    async fn update_password(
        &self,
        user_id: i64,
        password_hash: &str,
        changed_at: DateTime<Utc>,
    ) -> Result<(), AuthApiError> {
        let mut conn = self.pool.acquire().await?;
        users::update_password(user_id, password_hash, changed_at, &mut conn).await
    }

    async fn record_login_attempt(&self, user_id: i64, attempted_at: DateTime<Utc>) -> Result<(), AuthApiError> {
        let mut conn = self.pool.acquire().await?;
        users::record_login_attempt(user_id, attempted_at, &mut conn).await
    }
}

impl UserManagement for SqliteDatabase {
    async fn fetch_all_users(&self) -> Result<Vec<UserProfile>, UserApiError> {
        let mut conn = self.pool.acquire().await?;
        users::fetch_all_profiles(&mut conn).await
    }

    async fn fetch_user_profile(&self, user_id: i64) -> Result<Option<UserProfile>, UserApiError> {
        let mut conn = self.pool.acquire().await?;
        users::fetch_profile(user_id, &mut conn).await
    }
}

impl ProductManagement for SqliteDatabase {
    async fn insert_product(&self, product: NewProduct) -> Result<Product, ProductApiError> {
        let mut tx = self.pool.begin().await?;
        let product = products::insert_product(product, &mut tx).await?;
        tx.commit().await?;
        Ok(product)
    }

    async fn fetch_all_products(&self) -> Result<Vec<ProductWithCreator>, ProductApiError> {
        let mut conn = self.pool.acquire().await?;
        products::fetch_all_with_creators(&mut conn).await
    }

    async fn fetch_products_for_user(&self, user_id: i64) -> Result<Vec<Product>, ProductApiError> {
        let mut conn = self.pool.acquire().await?;
        products::fetch_for_user(user_id, &mut conn).await
    }

    async fn fetch_bestsellers_for_user(&self, user_id: i64) -> Result<Vec<Product>, ProductApiError> {
        let mut conn = self.pool.acquire().await?;
        products::fetch_bestsellers_for_user(user_id, &mut conn).await
    }
}

impl ApiKeyManagement for SqliteDatabase {
    async fn fetch_api_keys_for_user(&self, user_id: i64) -> Result<Vec<ApiKeySummary>, ApiKeyApiError> {
        let mut conn = self.pool.acquire().await?;
        api_keys::fetch_for_user(user_id, &mut conn).await
    }

    async fn api_key_name_exists(&self, user_id: i64, name: &str) -> Result<bool, ApiKeyApiError> {
        let mut conn = self.pool.acquire().await?;
        api_keys::name_exists(user_id, name, &mut conn).await
    }

    async fn insert_api_key(&self, key: NewApiKey) -> Result<ApiKey, ApiKeyApiError> {
        let mut tx = self.pool.begin().await?;
        let key = api_keys::insert(key, &mut tx).await?;
        tx.commit().await?;
        Ok(key)
    }

    async fn delete_api_key(&self, user_id: i64, key_id: i64) -> Result<bool, ApiKeyApiError> {
        let mut conn = self.pool.acquire().await?;
        api_keys::delete(user_id, key_id, &mut conn).await
    }
}

impl SalesTracking for SqliteDatabase {
    async fn apply_order_sales(&self, order: &SalesOrder) -> Result<SalesUpdate, SalesApiError> {
        let mut tx = self.pool.begin().await?;
        if let Some(delivery_id) = &order.delivery_id {
            if !sales::record_delivery(delivery_id, order.order_id, &mut tx).await? {
                debug!("🗃️ Webhook delivery {delivery_id} for order {} was already processed", order.order_id);
                tx.rollback().await?;
                return Ok(SalesUpdate::DuplicateDelivery);
            }
        }
        let mut products_updated = 0;
        let mut products_not_found = 0;
        for item in &order.line_items {
            if sales::increment_sales_count(item.product_id, item.quantity, &mut tx).await? {
                products_updated += 1;
            } else {
                warn!("🗃️ Order {} refers to product {}, which is not in the database", order.order_id, item.product_id);
                products_not_found += 1;
            }
        }
        tx.commit().await?;
        Ok(SalesUpdate::Applied { products_updated, products_not_found })
    }
}

impl SqliteDatabase {
    /// Creates a new database API object
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("🗃️ Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Brings the schema up to date. Safe to call on every start.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./src/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Database migrations complete");
        Ok(())
    }
}
