/// Append-only history of classified mailbox signals. Rows are written once
/// per update record and never touched again.
use serde::Serialize;
use sqlx::SqlitePool;

use crate::db;
use crate::models::update::EmailUpdateRecord;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct LoggedUpdate {
    pub id: i64,
    pub company_key: String,
    pub verdict: String,
    pub suggested_status: Option<String>,
    pub subject: String,
    pub sender: String,
    pub ts: i64,
    pub applied: bool,
    pub recorded_at: i64,
}

pub async fn record_update(
    pool: &SqlitePool,
    owner: &str,
    update: &EmailUpdateRecord,
    applied: bool,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO email_updates
            (owner, company_key, verdict, suggested_status, subject, sender, ts, applied, recorded_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(owner)
    .bind(&update.company_key)
    .bind(update.verdict.as_str())
    .bind(update.suggested_status.map(|s| s.as_str()))
    .bind(&update.subject)
    .bind(&update.sender)
    .bind(update.timestamp)
    .bind(applied)
    .bind(db::now_epoch())
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn history(
    pool: &SqlitePool,
    owner: &str,
    limit: i64,
) -> Result<Vec<LoggedUpdate>, sqlx::Error> {
    sqlx::query_as::<_, LoggedUpdate>(
        r#"
        SELECT id, company_key, verdict, suggested_status, subject, sender, ts, applied, recorded_at
        FROM email_updates
        WHERE owner = ?
        ORDER BY recorded_at DESC, id DESC
        LIMIT ?
        "#,
    )
    .bind(owner)
    .bind(limit)
    .fetch_all(pool)
    .await
}
