use backoffice_engine::db_types::{ApiKeySummary, Product, ProductWithCreator, UserProfile, UserSummary};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Missing fields deserialize as empty strings, so that they are reported by the same validation as blank ones.

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub expires_in: String,
    pub user: UserSummary,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[serde(default)]
    pub current_password: String,
    #[serde(default)]
    pub new_password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub message: String,
    pub token: String,
    pub expires_in: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserList {
    pub users: Vec<UserProfile>,
    pub total: usize,
}

impl From<Vec<UserProfile>> for UserList {
    fn from(users: Vec<UserProfile>) -> Self {
        Self { total: users.len(), users }
    }
}

//----------------------------------------------   API keys   ----------------------------------------------------------
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewApiKeyRequest {
    #[serde(default)]
    pub name: String,
}

/// The only time the key itself is returned to its owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewApiKeyResponse {
    pub id: i64,
    pub name: String,
    pub key: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeleteApiKeyRequest {
    pub id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteApiKeyResponse {
    pub id: i64,
    pub message: String,
}

pub type ApiKeyList = Vec<ApiKeySummary>;

//----------------------------------------------   Products   ----------------------------------------------------------
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewProductRequest {
    #[serde(default)]
    pub title: String,
    /// A decimal string, e.g. "19.99"
    #[serde(default)]
    pub price: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedProduct {
    pub id: i64,
    /// Shopify ids do not fit in a JavaScript number
    pub shopify_id: String,
    pub title: String,
    pub price: Option<String>,
    pub created_by: i64,
    pub sales_count: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductList<P> {
    pub products: Vec<P>,
    pub total: usize,
}

impl<P> From<Vec<P>> for ProductList<P> {
    fn from(products: Vec<P>) -> Self {
        Self { total: products.len(), products }
    }
}

pub type AllProducts = ProductList<ProductWithCreator>;
pub type MyProducts = ProductList<Product>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bestsellers {
    pub bestsellers: Vec<Product>,
    pub total: usize,
}

impl From<Vec<Product>> for Bestsellers {
    fn from(bestsellers: Vec<Product>) -> Self {
        Self { total: bestsellers.len(), bestsellers }
    }
}

//----------------------------------------------   Webhooks   ----------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesWebhookResponse {
    pub message: String,
    pub order_id: i64,
    pub products_updated: usize,
    pub products_failed: usize,
}
