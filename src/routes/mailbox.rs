use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::services::{scheduler, session_service};

use super::{AppState, DEFAULT_OWNER};

#[derive(Deserialize)]
pub struct OwnerQuery {
    owner: Option<String>,
}

#[derive(Deserialize)]
pub struct CallbackQuery {
    code: String,
    state: String,
}

fn owner_or_default(owner: Option<String>) -> String {
    owner.unwrap_or_else(|| DEFAULT_OWNER.to_string())
}

/// GET /mailbox/connect - start the authorization flow, returns the URL the
/// frontend should redirect the user to
pub async fn connect(
    State(state): State<AppState>,
    Query(q): Query<OwnerQuery>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let owner = owner_or_default(q.owner);
    let url = state
        .oauth
        .authorization_url(&owner)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    Ok(Json(json!({ "ok": true, "auth_url": url })))
}

/// GET /mailbox/callback - code exchange; persists the session and
/// schedules the post-connect scan
pub async fn callback(
    State(state): State<AppState>,
    Query(q): Query<CallbackQuery>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let (owner, tokens) = state
        .oauth
        .exchange_callback(&q.code, &q.state)
        .await
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    session_service::save_session(&state.pool, &owner, &tokens)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    tracing::info!(owner = %owner, "mailbox connected");
    scheduler::spawn_initial_scan(state.pool.clone(), state.mail.clone(), owner.clone());

    Ok(Json(json!({ "ok": true, "owner": owner })))
}

/// GET /mailbox/status
pub async fn status(
    State(state): State<AppState>,
    Query(q): Query<OwnerQuery>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let owner = owner_or_default(q.owner);
    let session = session_service::get_session(&state.pool, &owner)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok(Json(match session {
        Some(s) if s.active => json!({
            "owner": owner,
            "connected": true,
            "connected_at": s.connected_at,
            "last_scan_ts": s.last_scan_ts,
        }),
        _ => json!({ "owner": owner, "connected": false }),
    }))
}

/// DELETE /mailbox - disconnect and stop recurring scans
pub async fn disconnect(
    State(state): State<AppState>,
    Query(q): Query<OwnerQuery>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let owner = owner_or_default(q.owner);
    let existed = session_service::deactivate_session(&state.pool, &owner)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    if !existed {
        return Err((StatusCode::NOT_FOUND, "no mailbox connection".to_string()));
    }
    tracing::info!(owner = %owner, "mailbox disconnected");
    Ok(Json(json!({ "ok": true })))
}
