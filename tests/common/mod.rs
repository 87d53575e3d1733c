use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::collections::HashSet;

use jobtrack_hub::db;
use jobtrack_hub::mail::{FetchedMessage, MailError, MailProvider};
use jobtrack_hub::models::job::{JobStatus, NewJob};
use jobtrack_hub::oauth::OAuthTokens;
use jobtrack_hub::services::{job_service, session_service};

/// In-memory mail provider. Returns its messages in insertion order, like a
/// real provider's listing order.
#[derive(Default)]
pub struct FakeMail {
    pub messages: Vec<FetchedMessage>,
    pub fail_fetch_ids: HashSet<String>,
    pub fail_listing: bool,
    pub reject_token: bool,
}

impl FakeMail {
    pub fn with_messages(messages: Vec<FetchedMessage>) -> Self {
        Self {
            messages,
            ..Default::default()
        }
    }
}

#[async_trait]
impl MailProvider for FakeMail {
    async fn list_message_ids(
        &self,
        _access_token: &str,
        _query: &str,
        max: u32,
    ) -> Result<Vec<String>, MailError> {
        if self.reject_token {
            return Err(MailError::Unauthorized);
        }
        if self.fail_listing {
            return Err(MailError::Request(anyhow::anyhow!("listing unavailable")));
        }
        Ok(self
            .messages
            .iter()
            .take(max as usize)
            .map(|m| m.id.clone())
            .collect())
    }

    async fn get_message(
        &self,
        _access_token: &str,
        id: &str,
    ) -> Result<FetchedMessage, MailError> {
        if self.fail_fetch_ids.contains(id) {
            return Err(MailError::Request(anyhow::anyhow!("undecodable message")));
        }
        self.messages
            .iter()
            .find(|m| m.id == id)
            .cloned()
            .ok_or_else(|| MailError::Request(anyhow::anyhow!("no such message")))
    }
}

pub fn message(id: &str, subject: &str, sender: &str, body: &str) -> FetchedMessage {
    FetchedMessage {
        id: id.to_string(),
        subject: subject.to_string(),
        sender: sender.to_string(),
        body: body.to_string(),
        timestamp: 1_700_000_000,
    }
}

pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory pool");
    db::run_migrations(&pool).await.expect("migrations");
    pool
}

pub async fn connect_mailbox(pool: &SqlitePool, owner: &str) {
    let tokens = OAuthTokens {
        access_token: "test-token".to_string(),
        refresh_token: None,
        expires_at: None,
    };
    session_service::save_session(pool, owner, &tokens)
        .await
        .expect("session saved");
}

pub async fn track_job(
    pool: &SqlitePool,
    owner: &str,
    external_id: &str,
    company: &str,
    status: JobStatus,
) -> i64 {
    let job = job_service::save_job(
        pool,
        owner,
        &NewJob {
            external_id: external_id.to_string(),
            title: format!("Engineer at {company}"),
            company_name: company.to_string(),
            apply_link: None,
            location: None,
            status: Some(status),
        },
    )
    .await
    .expect("job saved");
    job.id
}
