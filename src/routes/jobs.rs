use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::SqlitePool;

use crate::models::job::{JobStatus, NewJob};
use crate::services::job_service::{self, SaveJobError};

use super::DEFAULT_OWNER;

#[derive(Deserialize)]
pub struct OwnerQuery {
    owner: Option<String>,
}

#[derive(Deserialize)]
pub struct SaveJobRequest {
    owner: Option<String>,
    #[serde(flatten)]
    job: NewJob,
}

#[derive(Deserialize)]
pub struct StatusPatch {
    owner: Option<String>,
    status: JobStatus,
}

fn owner_or_default(owner: Option<String>) -> String {
    owner.unwrap_or_else(|| DEFAULT_OWNER.to_string())
}

/// POST /jobs - save a listing to the tracked list
pub async fn save_job(
    State(pool): State<SqlitePool>,
    Json(req): Json<SaveJobRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let owner = owner_or_default(req.owner);
    match job_service::save_job(&pool, &owner, &req.job).await {
        Ok(job) => Ok(Json(json!({ "ok": true, "job": job }))),
        Err(SaveJobError::Invalid(msg)) => Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "ok": false, "error": msg })),
        )),
        Err(SaveJobError::Store(e)) => {
            tracing::error!(error = %e, "job save failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "ok": false, "error": "job store unavailable" })),
            ))
        }
    }
}

/// GET /jobs - tracked jobs for an owner, newest first
pub async fn list_jobs(
    State(pool): State<SqlitePool>,
    Query(q): Query<OwnerQuery>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let owner = owner_or_default(q.owner);
    let jobs = job_service::list_jobs(&pool, &owner)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    Ok(Json(json!({ "owner": owner, "count": jobs.len(), "jobs": jobs })))
}

/// PATCH /jobs/:id - manual status edit, unrestricted by the reconciler's
/// terminal-status rule
pub async fn update_status(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
    Json(patch): Json<StatusPatch>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let owner = owner_or_default(patch.owner);
    let job = job_service::set_status(&pool, &owner, id, patch.status)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .ok_or_else(|| (StatusCode::NOT_FOUND, "job not found".to_string()))?;
    Ok(Json(json!({ "ok": true, "job": job })))
}

/// DELETE /jobs/:id
pub async fn delete_job(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
    Query(q): Query<OwnerQuery>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let owner = owner_or_default(q.owner);
    let deleted = job_service::delete_job(&pool, &owner, id)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    if !deleted {
        return Err((StatusCode::NOT_FOUND, "job not found".to_string()));
    }
    Ok(Json(json!({ "ok": true })))
}
