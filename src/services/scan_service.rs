/// Mailbox scan pipeline: one bounded listing call, bounded-concurrency
/// message fetches, classification, then reconciliation against the
/// owner's tracked jobs.
use futures::stream::{self, StreamExt};
use serde::Serialize;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{info, warn};

use crate::classifier::{self, SUBJECT_HINTS};
use crate::mail::{MailError, MailProvider};
use crate::models::session::MailboxSession;
use crate::models::update::{EmailUpdateRecord, Verdict};
use crate::services::{reconcile_service, session_service};

/// Listing bounds: recency window, result cap, fetch parallelism.
const LOOKBACK: &str = "newer_than:2d";
const MAX_MESSAGES: u32 = 15;
const FETCH_CONCURRENCY: usize = 5;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("mailbox not connected")]
    Unauthenticated,
    #[error("mailbox credential rejected, reconnect required")]
    SessionExpired,
    #[error("mailbox check failed: {0}")]
    Provider(anyhow::Error),
    #[error("store write failed: {0}")]
    Persistence(#[from] sqlx::Error),
}

impl From<MailError> for ScanError {
    fn from(e: MailError) -> Self {
        match e {
            MailError::Unauthorized => Self::SessionExpired,
            MailError::Request(inner) => Self::Provider(inner),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ScanReport {
    pub updates: Vec<EmailUpdateRecord>,
    pub applied_count: u32,
    pub touched_job_ids: Vec<i64>,
}

/// Provider search expression: recent messages whose subject looks
/// job-related. A prefilter only; the classifier re-checks every message.
fn listing_query() -> String {
    format!("{} subject:({})", LOOKBACK, SUBJECT_HINTS.join(" OR "))
}

/// Run the listing + fetch + classify stage for one session. Results keep
/// listing order; a message that fails to fetch or decode is skipped and
/// the scan continues. Only the listing call itself can fail the scan.
pub async fn scan_mailbox(
    provider: &dyn MailProvider,
    session: &MailboxSession,
) -> Result<Vec<EmailUpdateRecord>, ScanError> {
    let token = session.access_token.as_str();
    let ids = provider
        .list_message_ids(token, &listing_query(), MAX_MESSAGES)
        .await?;

    // buffered() preserves input order, so results stay deterministic even
    // though up to FETCH_CONCURRENCY fetches are in flight.
    let fetched: Vec<_> = stream::iter(ids)
        .map(|id| async move {
            let result = provider.get_message(token, &id).await;
            (id, result)
        })
        .buffered(FETCH_CONCURRENCY)
        .collect()
        .await;

    let mut updates = Vec::new();
    for (id, result) in fetched {
        let msg = match result {
            Ok(m) => m,
            Err(e) => {
                warn!(message_id = %id, error = %e, "skipping message that failed to fetch");
                continue;
            }
        };
        let c = classifier::classify(&msg.subject, &msg.body, &msg.sender);
        if c.verdict == Verdict::None {
            continue;
        }
        updates.push(EmailUpdateRecord {
            company_key: c.company_key,
            verdict: c.verdict,
            suggested_status: c.suggested_status,
            subject: msg.subject,
            sender: msg.sender,
            timestamp: msg.timestamp,
        });
    }

    Ok(updates)
}

/// Full scan for an owner: load the session, scan the mailbox, reconcile
/// every update against the owner's tracked jobs. A rejected credential
/// deactivates the session before the error is surfaced; any other
/// provider failure leaves the session alone for the next trigger.
pub async fn run_scan(
    pool: &SqlitePool,
    provider: &dyn MailProvider,
    owner: &str,
) -> Result<ScanReport, ScanError> {
    let session = session_service::get_active_session(pool, owner)
        .await?
        .ok_or(ScanError::Unauthenticated)?;

    let updates = match scan_mailbox(provider, &session).await {
        Ok(updates) => updates,
        Err(ScanError::SessionExpired) => {
            warn!(owner = %owner, "mailbox credential rejected, disconnecting session");
            session_service::deactivate_session(pool, owner).await?;
            return Err(ScanError::SessionExpired);
        }
        Err(e) => return Err(e),
    };

    let outcome = reconcile_service::reconcile_all(pool, owner, &updates).await?;
    info!(
        owner = %owner,
        updates = updates.len(),
        applied = outcome.applied_count,
        "mailbox scan finished"
    );

    Ok(ScanReport {
        updates,
        applied_count: outcome.applied_count,
        touched_job_ids: outcome.touched_job_ids,
    })
}
