use sqlx::SqliteConnection;

use crate::{db_types::Role, traits::AuthApiError};

pub async fn fetch_role_by_id(role_id: i64, conn: &mut SqliteConnection) -> Result<Option<Role>, AuthApiError> {
    let role = sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE id = ?").bind(role_id).fetch_optional(conn).await?;
    Ok(role)
}
