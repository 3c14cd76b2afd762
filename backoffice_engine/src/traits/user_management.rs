use thiserror::Error;

use crate::db_types::UserProfile;

#[allow(async_fn_in_trait)]
pub trait UserManagement {
    /// All users, oldest first.
    async fn fetch_all_users(&self) -> Result<Vec<UserProfile>, UserApiError>;

    async fn fetch_user_profile(&self, user_id: i64) -> Result<Option<UserProfile>, UserApiError>;
}

#[derive(Debug, Clone, Error)]
pub enum UserApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("User {0} does not exist")]
    UserNotFound(i64),
}

impl From<sqlx::Error> for UserApiError {
    fn from(e: sqlx::Error) -> Self {
        UserApiError::DatabaseError(e.to_string())
    }
}
