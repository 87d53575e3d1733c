use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use serde::Deserialize;
use serde_json::json;

use crate::services::scan_service::{self, ScanError};
use crate::services::update_log_service;

use super::{AppState, DEFAULT_OWNER};

#[derive(Deserialize)]
pub struct OwnerQuery {
    owner: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct TriggerScanRequest {
    owner: Option<String>,
}

/// POST /scan - user-initiated "check now". Runs one scan synchronously and
/// returns its update records; the recurring timer is left alone.
pub async fn trigger_scan(
    State(state): State<AppState>,
    body: Option<Json<TriggerScanRequest>>,
) -> impl IntoResponse {
    let owner = body
        .and_then(|Json(req)| req.owner)
        .unwrap_or_else(|| DEFAULT_OWNER.to_string());

    match scan_service::run_scan(&state.pool, state.mail.as_ref(), &owner).await {
        Ok(report) => Json(json!({
            "ok": true,
            "updates": report.updates,
            "applied_count": report.applied_count,
            "touched_job_ids": report.touched_job_ids,
        }))
        .into_response(),
        Err(e) => {
            let status = match &e {
                ScanError::Unauthenticated | ScanError::SessionExpired => StatusCode::UNAUTHORIZED,
                ScanError::Provider(_) => StatusCode::BAD_GATEWAY,
                ScanError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (status, Json(json!({ "ok": false, "error": e.to_string() }))).into_response()
        }
    }
}

/// GET /updates - recent classified signals for an owner
pub async fn update_history(
    State(state): State<AppState>,
    Query(q): Query<OwnerQuery>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let owner = q.owner.unwrap_or_else(|| DEFAULT_OWNER.to_string());
    let updates = update_log_service::history(&state.pool, &owner, 50)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    Ok(Json(json!({ "owner": owner, "count": updates.len(), "updates": updates })))
}
