use std::fmt::Debug;

use crate::{
    db_types::UserProfile,
    traits::{UserApiError, UserManagement},
};

/// Read-only access to user accounts.
#[derive(Clone)]
pub struct UserApi<B> {
    db: B,
}

impl<B: Debug> Debug for UserApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "UserApi ({:?})", self.db)
    }
}

impl<B> UserApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> UserApi<B>
where B: UserManagement
{
    pub async fn all_users(&self) -> Result<Vec<UserProfile>, UserApiError> {
        self.db.fetch_all_users().await
    }

    pub async fn profile(&self, user_id: i64) -> Result<UserProfile, UserApiError> {
        self.db.fetch_user_profile(user_id).await?.ok_or(UserApiError::UserNotFound(user_id))
    }
}
