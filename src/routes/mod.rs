use axum::extract::FromRef;
use axum::routing::{delete, get, patch, post};
use axum::Router;
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::mail::MailProvider;
use crate::oauth::OAuthManager;
use crate::search::SearchClient;

pub mod jobs;
pub mod mailbox;
pub mod scan;
pub mod search;

/// Owner used when a request does not carry one (single-user deployments).
pub const DEFAULT_OWNER: &str = "default";

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub mail: Arc<dyn MailProvider>,
    pub search: Arc<SearchClient>,
    pub oauth: Arc<OAuthManager>,
}

impl FromRef<AppState> for SqlitePool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/search", get(search::search_jobs))
        .route("/jobs", post(jobs::save_job).get(jobs::list_jobs))
        .route("/jobs/:id", patch(jobs::update_status).delete(jobs::delete_job))
        .route("/scan", post(scan::trigger_scan))
        .route("/updates", get(scan::update_history))
        .route("/mailbox/connect", get(mailbox::connect))
        .route("/mailbox/callback", get(mailbox::callback))
        .route("/mailbox/status", get(mailbox::status))
        .route("/mailbox", delete(mailbox::disconnect))
        .with_state(state)
}
