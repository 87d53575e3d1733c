use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::search::SearchFilters;

use super::AppState;

#[derive(Deserialize)]
pub struct SearchQuery {
    q: String,
    employment_type: Option<String>,
    remote_only: Option<bool>,
    date_posted: Option<String>,
}

/// GET /search?q=... - proxy to the job-search provider
pub async fn search_jobs(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    if params.q.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "ok": false, "error": "query must not be empty" })),
        ));
    }

    let filters = SearchFilters {
        employment_type: params.employment_type,
        remote_only: params.remote_only,
        date_posted: params.date_posted,
    };

    match state.search.search(&params.q, &filters).await {
        Ok(results) => Ok(Json(json!({
            "ok": true,
            "count": results.len(),
            "results": results,
        }))),
        Err(e) => {
            tracing::warn!(error = %e, "job search failed");
            Err((
                StatusCode::BAD_GATEWAY,
                Json(json!({ "ok": false, "error": e.to_string() })),
            ))
        }
    }
}
