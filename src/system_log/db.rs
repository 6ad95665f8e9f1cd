use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::{common::error::ServerError, system_log::models::SystemLogEntry};

pub async fn create_system_log(
    pool: &Pool<Postgres>,
    entry: &SystemLogEntry,
) -> Result<(), ServerError> {
    let row = sqlx::query(
        r#"
        INSERT INTO "system_log" (subject_id, subject_type, action, ceverity, function, description, metadata, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(&entry.subject_id)
    .bind(entry.subject_type)
    .bind(entry.action)
    .bind(entry.ceverity)
    .bind(&entry.function)
    .bind(&entry.description)
    .bind(&entry.metadata)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    if row.rows_affected() == 0 {
        return Err(ServerError::Internal("Failed to create system log".into()));
    }

    Ok(())
}
