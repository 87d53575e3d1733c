/// Tracked-job store. One row per (owner, external_id); status writes that
/// race the reconciler go through the conditional update below.
use sqlx::SqlitePool;
use thiserror::Error;

use crate::db;
use crate::models::job::{JobStatus, NewJob, TrackedJob};

#[derive(Debug, Error)]
pub enum SaveJobError {
    #[error("invalid job: {0}")]
    Invalid(&'static str),
    #[error("job store unavailable: {0}")]
    Store(#[from] sqlx::Error),
}

/// Save a listing for an owner. Re-saving an already tracked job never
/// duplicates it: listing fields are refreshed, and the status is written
/// only when a different one was explicitly supplied.
pub async fn save_job(
    pool: &SqlitePool,
    owner: &str,
    new: &NewJob,
) -> Result<TrackedJob, SaveJobError> {
    if new.external_id.trim().is_empty() {
        return Err(SaveJobError::Invalid("external_id is required"));
    }
    if new.title.trim().is_empty() {
        return Err(SaveJobError::Invalid("title is required"));
    }
    if new.company_name.trim().is_empty() {
        return Err(SaveJobError::Invalid("company_name is required"));
    }

    let now = db::now_epoch();
    let apply_link = new.apply_link.clone().unwrap_or_default();

    if let Some(existing) = find_by_external_id(pool, owner, &new.external_id).await? {
        if existing.title != new.title
            || existing.company_name != new.company_name
            || existing.apply_link != apply_link
            || existing.location != new.location
        {
            sqlx::query(
                "UPDATE jobs SET title = ?, company_name = ?, apply_link = ?, location = ? WHERE id = ?",
            )
            .bind(&new.title)
            .bind(&new.company_name)
            .bind(&apply_link)
            .bind(&new.location)
            .bind(existing.id)
            .execute(pool)
            .await?;
        }

        if let Some(status) = new.status {
            if status != existing.status {
                sqlx::query("UPDATE jobs SET status = ?, last_updated = ? WHERE id = ?")
                    .bind(status.as_str())
                    .bind(now)
                    .bind(existing.id)
                    .execute(pool)
                    .await?;
            }
        }

        let job = get_job(pool, owner, existing.id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;
        return Ok(job);
    }

    let status = new.status.unwrap_or(JobStatus::Saved);
    let result = sqlx::query(
        r#"
        INSERT INTO jobs (owner, external_id, title, company_name, apply_link, location, status, date_added, last_updated)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(owner)
    .bind(&new.external_id)
    .bind(&new.title)
    .bind(&new.company_name)
    .bind(&apply_link)
    .bind(&new.location)
    .bind(status.as_str())
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    let job = get_job(pool, owner, result.last_insert_rowid())
        .await?
        .ok_or(sqlx::Error::RowNotFound)?;
    Ok(job)
}

pub async fn find_by_external_id(
    pool: &SqlitePool,
    owner: &str,
    external_id: &str,
) -> Result<Option<TrackedJob>, sqlx::Error> {
    sqlx::query_as::<_, TrackedJob>("SELECT * FROM jobs WHERE owner = ? AND external_id = ?")
        .bind(owner)
        .bind(external_id)
        .fetch_optional(pool)
        .await
}

pub async fn get_job(
    pool: &SqlitePool,
    owner: &str,
    id: i64,
) -> Result<Option<TrackedJob>, sqlx::Error> {
    sqlx::query_as::<_, TrackedJob>("SELECT * FROM jobs WHERE owner = ? AND id = ?")
        .bind(owner)
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn list_jobs(pool: &SqlitePool, owner: &str) -> Result<Vec<TrackedJob>, sqlx::Error> {
    sqlx::query_as::<_, TrackedJob>(
        "SELECT * FROM jobs WHERE owner = ? ORDER BY date_added DESC, id DESC",
    )
    .bind(owner)
    .fetch_all(pool)
    .await
}

/// Conditional status write: applies only while the row still carries
/// `from`, so overlapping reconcile passes cannot double-apply. Returns
/// whether a row actually changed.
pub async fn update_status_if(
    pool: &SqlitePool,
    job_id: i64,
    from: JobStatus,
    to: JobStatus,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE jobs SET status = ?, last_updated = ? WHERE id = ? AND status = ?")
        .bind(to.as_str())
        .bind(db::now_epoch())
        .bind(job_id)
        .bind(from.as_str())
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Manual status edit. Unrestricted: the terminal-status rule only binds
/// the automatic reconcile path. No-op writes leave last_updated alone.
pub async fn set_status(
    pool: &SqlitePool,
    owner: &str,
    id: i64,
    to: JobStatus,
) -> Result<Option<TrackedJob>, sqlx::Error> {
    let Some(job) = get_job(pool, owner, id).await? else {
        return Ok(None);
    };
    if job.status != to {
        sqlx::query("UPDATE jobs SET status = ?, last_updated = ? WHERE id = ?")
            .bind(to.as_str())
            .bind(db::now_epoch())
            .bind(id)
            .execute(pool)
            .await?;
    }
    get_job(pool, owner, id).await
}

pub async fn delete_job(pool: &SqlitePool, owner: &str, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM jobs WHERE owner = ? AND id = ?")
        .bind(owner)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
