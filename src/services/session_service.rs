/// Mailbox session store. Sessions are written whole on connect and only
/// ever flipped inactive afterwards, never partially updated.
use sqlx::SqlitePool;

use crate::db;
use crate::models::session::MailboxSession;
use crate::oauth::OAuthTokens;

pub async fn save_session(
    pool: &SqlitePool,
    owner: &str,
    tokens: &OAuthTokens,
) -> Result<MailboxSession, sqlx::Error> {
    let now = db::now_epoch();
    sqlx::query(
        r#"
        INSERT OR REPLACE INTO mailbox_sessions
            (owner, access_token, refresh_token, expires_at, active, connected_at, last_scan_ts)
        VALUES (?, ?, ?, ?, 1, ?, NULL)
        "#,
    )
    .bind(owner)
    .bind(&tokens.access_token)
    .bind(&tokens.refresh_token)
    .bind(tokens.expires_at)
    .bind(now)
    .execute(pool)
    .await?;

    get_session(pool, owner)
        .await?
        .ok_or(sqlx::Error::RowNotFound)
}

pub async fn get_session(
    pool: &SqlitePool,
    owner: &str,
) -> Result<Option<MailboxSession>, sqlx::Error> {
    sqlx::query_as::<_, MailboxSession>("SELECT * FROM mailbox_sessions WHERE owner = ?")
        .bind(owner)
        .fetch_optional(pool)
        .await
}

pub async fn get_active_session(
    pool: &SqlitePool,
    owner: &str,
) -> Result<Option<MailboxSession>, sqlx::Error> {
    sqlx::query_as::<_, MailboxSession>(
        "SELECT * FROM mailbox_sessions WHERE owner = ? AND active = 1",
    )
    .bind(owner)
    .fetch_optional(pool)
    .await
}

pub async fn list_active_sessions(pool: &SqlitePool) -> Result<Vec<MailboxSession>, sqlx::Error> {
    sqlx::query_as::<_, MailboxSession>("SELECT * FROM mailbox_sessions WHERE active = 1")
        .fetch_all(pool)
        .await
}

/// Disable scanning for an owner. Used both for an explicit disconnect and
/// when the provider rejects the credential.
pub async fn deactivate_session(pool: &SqlitePool, owner: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE mailbox_sessions SET active = 0 WHERE owner = ?")
        .bind(owner)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn update_last_scan(pool: &SqlitePool, owner: &str) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE mailbox_sessions SET last_scan_ts = ? WHERE owner = ?")
        .bind(db::now_epoch())
        .bind(owner)
        .execute(pool)
        .await?;
    Ok(())
}
