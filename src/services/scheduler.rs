use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use sqlx::SqlitePool;

use crate::mail::MailProvider;
use crate::services::{scan_service, session_service};
use crate::services::scan_service::ScanError;

/// Delay before the one-shot scan that follows a fresh mailbox connection.
const INITIAL_SCAN_DELAY: Duration = Duration::from_secs(10);

/// Starts the recurring scan loop. Every tick it walks active sessions and
/// scans the ones whose last scan is older than `scan_interval_secs`.
pub fn start(pool: SqlitePool, mail: Arc<dyn MailProvider>, scan_interval_secs: i64) {
    tokio::spawn(async move {
        loop {
            // Safety tick: run every 60s; the per-session interval throttles inside the loop
            let tick_start = std::time::Instant::now();
            match session_service::list_active_sessions(&pool).await {
                Ok(sessions) => {
                    for session in sessions {
                        if let Some(last) = session.last_scan_ts {
                            let now = chrono::Utc::now().timestamp();
                            if now - last < scan_interval_secs {
                                continue;
                            }
                        }
                        let p = pool.clone();
                        let m = mail.clone();
                        tokio::spawn(async move {
                            run_scheduled_scan(&p, m.as_ref(), &session.owner).await;
                        });
                    }
                }
                Err(e) => warn!("scheduler: listing sessions failed: {}", e),
            }
            // sleep remaining out of 60s
            let elapsed = tick_start.elapsed();
            let sleep_ms = 60_000u64.saturating_sub(elapsed.as_millis() as u64);
            tokio::time::sleep(Duration::from_millis(sleep_ms.max(1))).await;
        }
    });
}

/// One-shot scan shortly after a mailbox connection is established. The
/// delay lets the connect flow settle before the first listing call.
pub fn spawn_initial_scan(pool: SqlitePool, mail: Arc<dyn MailProvider>, owner: String) {
    tokio::spawn(async move {
        tokio::time::sleep(INITIAL_SCAN_DELAY).await;
        run_scheduled_scan(&pool, mail.as_ref(), &owner).await;
    });
}

/// Scheduled scans stamp last_scan_ts so the recurring interval counts from
/// this attempt; a manual trigger never goes through here and never touches
/// the timer. Failures are logged and left for the next tick.
async fn run_scheduled_scan(pool: &SqlitePool, mail: &dyn MailProvider, owner: &str) {
    match scan_service::run_scan(pool, mail, owner).await {
        Ok(report) => {
            info!(
                owner = %owner,
                updates = report.updates.len(),
                applied = report.applied_count,
                "scheduled scan completed"
            );
            if let Err(e) = session_service::update_last_scan(pool, owner).await {
                warn!(owner = %owner, error = %e, "failed to stamp last scan time");
            }
        }
        Err(ScanError::SessionExpired) | Err(ScanError::Unauthenticated) => {
            // Session already deactivated (or never existed); recurring
            // scans stop until the owner reconnects.
            warn!(owner = %owner, "scheduled scan stopped: mailbox disconnected");
        }
        Err(e) => {
            warn!(owner = %owner, error = %e, "scheduled scan failed");
            if let Err(e) = session_service::update_last_scan(pool, owner).await {
                warn!(owner = %owner, error = %e, "failed to stamp last scan time");
            }
        }
    }
}
