//! Credential store operations.
//!
//! Generally clients should never call these methods directly, and prefer to use the [`crate::AuthManagement`] and
//! [`crate::UserManagement`] trait methods that are implemented on [`crate::SqliteDatabase`] instead.
use chrono::{DateTime, Utc};
use log::debug;
use sqlx::SqliteConnection;

use super::is_unique_violation;
use crate::{
    db_types::{NewUser, User, UserProfile},
    traits::{AuthApiError, UserApiError},
};

pub async fn fetch_user_by_id(user_id: i64, conn: &mut SqliteConnection) -> Result<Option<User>, AuthApiError> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?").bind(user_id).fetch_optional(conn).await?;
    Ok(user)
}

pub async fn fetch_user_by_email(email: &str, conn: &mut SqliteConnection) -> Result<Option<User>, AuthApiError> {
    let user =
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?").bind(email).fetch_optional(conn).await?;
    Ok(user)
}

pub async fn insert_user(user: NewUser, conn: &mut SqliteConnection) -> Result<User, AuthApiError> {
    let result = sqlx::query_as::<_, User>(
        r#"INSERT INTO users (name, email, password_hash, role_id, last_password_change, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        RETURNING *"#,
    )
    .bind(&user.name)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(user.role_id)
    .bind(user.created_at)
    .bind(user.created_at)
    .bind(user.created_at)
    .fetch_one(conn)
    .await;
    match result {
        Ok(user) => {
            debug!("🗃️ Inserted user #{} ({})", user.id, user.email);
            Ok(user)
        },
        Err(e) if is_unique_violation(&e) => Err(AuthApiError::EmailAlreadyRegistered),
        Err(e) => Err(e.into()),
    }
}

/// Writes the new hash and the new password epoch in one statement, so that no reader can observe one without the
/// other.
pub async fn update_password(
    user_id: i64,
    password_hash: &str,
    changed_at: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<(), AuthApiError> {
    let result =
        sqlx::query("UPDATE users SET password_hash = ?, last_password_change = ?, updated_at = ? WHERE id = ?")
            .bind(password_hash)
            .bind(changed_at)
            .bind(changed_at)
            .bind(user_id)
            .execute(conn)
            .await?;
    match result.rows_affected() {
        0 => Err(AuthApiError::UserNotFound),
        _ => Ok(()),
    }
}

pub async fn record_login_attempt(
    user_id: i64,
    attempted_at: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<(), AuthApiError> {
    sqlx::query("UPDATE users SET last_login_attempt = ? WHERE id = ?")
        .bind(attempted_at)
        .bind(user_id)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn fetch_all_profiles(conn: &mut SqliteConnection) -> Result<Vec<UserProfile>, UserApiError> {
    let users = sqlx::query_as::<_, UserProfile>(
        "SELECT id, name, email, created_at, updated_at FROM users ORDER BY created_at ASC, id ASC",
    )
    .fetch_all(conn)
    .await?;
    Ok(users)
}

pub async fn fetch_profile(user_id: i64, conn: &mut SqliteConnection) -> Result<Option<UserProfile>, UserApiError> {
    let user = sqlx::query_as::<_, UserProfile>("SELECT id, name, email, created_at, updated_at FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(conn)
        .await?;
    Ok(user)
}
