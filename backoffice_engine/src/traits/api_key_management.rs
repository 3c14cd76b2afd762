use thiserror::Error;

use crate::db_types::{ApiKey, ApiKeySummary, NewApiKey};

#[allow(async_fn_in_trait)]
pub trait ApiKeyManagement {
    async fn fetch_api_keys_for_user(&self, user_id: i64) -> Result<Vec<ApiKeySummary>, ApiKeyApiError>;

    async fn api_key_name_exists(&self, user_id: i64, name: &str) -> Result<bool, ApiKeyApiError>;

    async fn insert_api_key(&self, key: NewApiKey) -> Result<ApiKey, ApiKeyApiError>;

    /// Deletes the key only if it belongs to the given user. Returns whether a key was deleted.
    async fn delete_api_key(&self, user_id: i64, key_id: i64) -> Result<bool, ApiKeyApiError>;
}

#[derive(Debug, Clone, Error)]
pub enum ApiKeyApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Invalid input. {0}")]
    InvalidInput(String),
    #[error("An API key named '{0}' already exists")]
    DuplicateName(String),
    #[error("API key not found")]
    KeyNotFound,
}

impl From<sqlx::Error> for ApiKeyApiError {
    fn from(e: sqlx::Error) -> Self {
        ApiKeyApiError::DatabaseError(e.to_string())
    }
}
