/// Applies classified mailbox signals to tracked jobs.
use sqlx::SqlitePool;
use tracing::info;

use crate::models::job::TrackedJob;
use crate::models::update::EmailUpdateRecord;
use crate::services::{job_service, update_log_service};

#[derive(Debug, Default)]
pub struct ReconcileOutcome {
    pub applied_count: u32,
    pub touched_job_ids: Vec<i64>,
}

/// Company match: lowercase substring containment in either direction.
/// Sender domain and saved company name are independently sourced strings,
/// so neither side is authoritative.
pub fn company_matches(company_name: &str, company_key: &str) -> bool {
    let name = company_name.to_lowercase();
    let key = company_key.to_lowercase();
    !name.is_empty() && !key.is_empty() && (name.contains(&key) || key.contains(&name))
}

/// Reconcile one update against a snapshot of the owner's jobs. Every
/// matching job is reconciled on its own; there is no single-winner pick.
/// Returns the ids of jobs whose status actually changed.
///
/// Idempotence and lost-update safety both hang on the conditional write:
/// a job already at the suggested status is skipped here, and a job whose
/// status moved underneath the snapshot fails the status condition in the
/// store and stays untouched.
pub async fn reconcile_update(
    pool: &SqlitePool,
    update: &EmailUpdateRecord,
    jobs: &[TrackedJob],
) -> Result<Vec<i64>, sqlx::Error> {
    let Some(target) = update.suggested_status else {
        return Ok(Vec::new());
    };

    let mut touched = Vec::new();
    for job in jobs {
        if !company_matches(&job.company_name, &update.company_key) {
            continue;
        }
        if job.status == target || job.status.is_terminal() {
            continue;
        }
        if job_service::update_status_if(pool, job.id, job.status, target).await? {
            info!(
                job_id = job.id,
                company = %job.company_name,
                from = job.status.as_str(),
                to = target.as_str(),
                "job status reconciled from mailbox signal"
            );
            touched.push(job.id);
        }
    }
    Ok(touched)
}

/// Reconcile a batch of updates in order and append each to the history
/// log. The job snapshot is read once; overlapping passes are already
/// covered by the conditional write.
pub async fn reconcile_all(
    pool: &SqlitePool,
    owner: &str,
    updates: &[EmailUpdateRecord],
) -> Result<ReconcileOutcome, sqlx::Error> {
    let jobs = job_service::list_jobs(pool, owner).await?;
    let mut outcome = ReconcileOutcome::default();

    for update in updates {
        let touched = reconcile_update(pool, update, &jobs).await?;
        let applied = !touched.is_empty();
        update_log_service::record_update(pool, owner, update, applied).await?;
        if applied {
            outcome.applied_count += 1;
            for id in touched {
                if !outcome.touched_job_ids.contains(&id) {
                    outcome.touched_job_ids.push(id);
                }
            }
        }
    }

    Ok(outcome)
}
