use chrono::Utc;
use sqlx::SqliteConnection;

use super::is_unique_violation;
use crate::{
    db_types::{ApiKey, ApiKeySummary, NewApiKey},
    traits::ApiKeyApiError,
};

pub async fn fetch_for_user(user_id: i64, conn: &mut SqliteConnection) -> Result<Vec<ApiKeySummary>, ApiKeyApiError> {
    let keys = sqlx::query_as::<_, ApiKeySummary>(
        "SELECT id, name, created_at FROM api_keys WHERE user_id = ? ORDER BY created_at ASC, id ASC",
    )
    .bind(user_id)
    .fetch_all(conn)
    .await?;
    Ok(keys)
}

pub async fn name_exists(user_id: i64, name: &str, conn: &mut SqliteConnection) -> Result<bool, ApiKeyApiError> {
    let count: i64 = sqlx::query_scalar("SELECT count(*) FROM api_keys WHERE user_id = ? AND name = ?")
        .bind(user_id)
        .bind(name)
        .fetch_one(conn)
        .await?;
    Ok(count > 0)
}

pub async fn insert(key: NewApiKey, conn: &mut SqliteConnection) -> Result<ApiKey, ApiKeyApiError> {
    let now = Utc::now();
    let result = sqlx::query_as::<_, ApiKey>(
        r#"INSERT INTO api_keys (name, key, user_id, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?)
        RETURNING *"#,
    )
    .bind(&key.name)
    .bind(&key.key)
    .bind(key.user_id)
    .bind(now)
    .bind(now)
    .fetch_one(conn)
    .await;
    match result {
        Ok(k) => Ok(k),
        Err(e) if is_unique_violation(&e) => Err(ApiKeyApiError::DuplicateName(key.name)),
        Err(e) => Err(e.into()),
    }
}

pub async fn delete(user_id: i64, key_id: i64, conn: &mut SqliteConnection) -> Result<bool, ApiKeyApiError> {
    let result =
        sqlx::query("DELETE FROM api_keys WHERE id = ? AND user_id = ?").bind(key_id).bind(user_id).execute(conn).await?;
    Ok(result.rows_affected() > 0)
}
