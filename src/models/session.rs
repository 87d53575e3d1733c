use serde::Serialize;

/// Owner-scoped mailbox credential bundle. Created whole on OAuth exchange,
/// read on every scan, flipped inactive when the provider rejects it.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct MailboxSession {
    pub owner: String,
    #[serde(skip_serializing)]
    pub access_token: String,
    #[serde(skip_serializing)]
    pub refresh_token: Option<String>,
    pub expires_at: Option<i64>,
    pub active: bool,
    pub connected_at: i64,
    pub last_scan_ts: Option<i64>,
}
