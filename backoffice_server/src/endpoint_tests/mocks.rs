use backoffice_engine::{
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
use chrono::{DateTime, Utc};
use mockall::mock;
use shopify_tools::{ShopifyApiError, ShopifyProduct, StorefrontProducts};

mock! {
    pub Backend {}
    impl AuthManagement for Backend {
        async fn fetch_user_by_id(&self, user_id: i64) -> Result<Option<User>, AuthApiError>;
        async fn fetch_user_by_email(&self, email: &str) -> Result<Option<User>, AuthApiError>;
        async fn fetch_role_by_id(&self, role_id: i64) -> Result<Option<Role>, AuthApiError>;
        async fn insert_user(&self, user: NewUser) -> Result<User, AuthApiError>;
        async fn update_password(&self, user_id: i64, password_hash: &str, changed_at: DateTime<Utc>) -> Result<(), AuthApiError>;
        async fn record_login_attempt(&self, user_id: i64, attempted_at: DateTime<Utc>) -> Result<(), AuthApiError>;
    }
    impl UserManagement for Backend {
        async fn fetch_all_users(&self) -> Result<Vec<UserProfile>, UserApiError>;
        async fn fetch_user_profile(&self, user_id: i64) -> Result<Option<UserProfile>, UserApiError>;
    }
    impl ProductManagement for Backend {
        async fn insert_product(&self, product: NewProduct) -> Result<Product, ProductApiError>;
        async fn fetch_all_products(&self) -> Result<Vec<ProductWithCreator>, ProductApiError>;
        async fn fetch_products_for_user(&self, user_id: i64) -> Result<Vec<Product>, ProductApiError>;
        async fn fetch_bestsellers_for_user(&self, user_id: i64) -> Result<Vec<Product>, ProductApiError>;
    }
    impl ApiKeyManagement for Backend {
        async fn fetch_api_keys_for_user(&self, user_id: i64) -> Result<Vec<ApiKeySummary>, ApiKeyApiError>;
        async fn api_key_name_exists(&self, user_id: i64, name: &str) -> Result<bool, ApiKeyApiError>;
        async fn insert_api_key(&self, key: NewApiKey) -> Result<ApiKey, ApiKeyApiError>;
        async fn delete_api_key(&self, user_id: i64, key_id: i64) -> Result<bool, ApiKeyApiError>;
    }
    impl SalesTracking for Backend {
        async fn apply_order_sales(&self, order: &SalesOrder) -> Result<SalesUpdate, SalesApiError>;
    }
}

mock! {
    pub Storefront {}
    impl StorefrontProducts for Storefront {
        async fn create_product(&self, title: &str, price: &str) -> Result<ShopifyProduct, ShopifyApiError>;
    }
}
