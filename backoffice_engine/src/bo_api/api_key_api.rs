use std::fmt::Debug;

use log::info;

use crate::{
    db_types::{ApiKey, ApiKeySummary, NewApiKey},
    helpers::generate_api_key,
    traits::{ApiKeyApiError, ApiKeyManagement},
};

#[derive(Clone)]
pub struct ApiKeyApi<B> {
    db: B,
}

impl<B: Debug> Debug for ApiKeyApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ApiKeyApi ({:?})", self.db)
    }
}

impl<B> ApiKeyApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> ApiKeyApi<B>
where B: ApiKeyManagement
{
    pub async fn keys_for_user(&self, user_id: i64) -> Result<Vec<ApiKeySummary>, ApiKeyApiError> {
        self.db.fetch_api_keys_for_user(user_id).await
    }

    /// Generates and stores a new key. This is the only time the key material is handed out.
    pub async fn create_key(&self, user_id: i64, name: &str) -> Result<ApiKey, ApiKeyApiError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ApiKeyApiError::InvalidInput("API key name is required".to_string()));
        }
        if self.db.api_key_name_exists(user_id, name).await? {
            return Err(ApiKeyApiError::DuplicateName(name.to_string()));
        }
        let key = NewApiKey { user_id, name: name.to_string(), key: generate_api_key() };
        let key = self.db.insert_api_key(key).await?;
        info!("🔐️ User #{user_id} created API key #{} ('{}')", key.id, key.name);
        Ok(key)
    }

    /// Deletes one of the user's own keys. Keys belonging to other users are reported as not found.
    pub async fn revoke_key(&self, user_id: i64, key_id: i64) -> Result<(), ApiKeyApiError> {
        if self.db.delete_api_key(user_id, key_id).await? {
            info!("🔐️ User #{user_id} deleted API key #{key_id}");
            Ok(())
        } else {
            Err(ApiKeyApiError::KeyNotFound)
        }
    }
}
