use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::db_types::{Capability, NewUser, Role, User};

/// The credential store and role table.
#[allow(async_fn_in_trait)]
pub trait AuthManagement {
    async fn fetch_user_by_id(&self, user_id: i64) -> Result<Option<User>, AuthApiError>;

    /// Looks up a user by their (normalised) email address.
    async fn fetch_user_by_email(&self, email: &str) -> Result<Option<User>, AuthApiError>;

    async fn fetch_role_by_id(&self, role_id: i64) -> Result<Option<Role>, AuthApiError>;

    /// Creates a new user. Fails with [`AuthApiError::EmailAlreadyRegistered`] if the email is taken.
    async fn insert_user(&self, user: NewUser) -> Result<User, AuthApiError>;

    /// Replaces the password hash and the password-change timestamp in a single statement.
    async fn update_password(
        &self,
        user_id: i64,
        password_hash: &str,
        changed_at: DateTime<Utc>,
    ) -> Result<(), AuthApiError>;

    async fn record_login_attempt(&self, user_id: i64, attempted_at: DateTime<Utc>) -> Result<(), AuthApiError>;
}

#[derive(Debug, Clone, Error)]
pub enum AuthApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Invalid input. {0}")]
    InvalidInput(String),
    #[error("A user with this email address already exists")]
    EmailAlreadyRegistered,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Current password is incorrect")]
    IncorrectCurrentPassword,
    #[error("Too many login attempts. Please wait {0} seconds before trying again.")]
    TooManyAttempts(u64),
    #[error("User not found")]
    UserNotFound,
    #[error("Token invalidated by password change")]
    TokenSuperseded,
    #[error("Role not found")]
    RoleNotFound,
    #[error("Permission denied. The role does not grant {0}")]
    PermissionDenied(Capability),
    #[error("Could not hash password. {0}")]
    PasswordHashError(String),
}

impl From<sqlx::Error> for AuthApiError {
    fn from(e: sqlx::Error) -> Self {
        AuthApiError::DatabaseError(e.to_string())
    }
}
