use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub google_client_id: String,
    pub google_client_secret: String,
    pub oauth_redirect_url: String,
    pub job_search_api_url: String,
    pub job_search_api_key: String,
    pub scan_interval_secs: i64,
}

impl Config {
    pub fn from_env() -> Self {
        let port: u16 = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3030);
        Config {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://jobtrack.db".into()),
            port,
            google_client_id: env::var("GOOGLE_CLIENT_ID").unwrap_or_default(),
            google_client_secret: env::var("GOOGLE_CLIENT_SECRET").unwrap_or_default(),
            oauth_redirect_url: env::var("OAUTH_REDIRECT_URL")
                .unwrap_or_else(|_| format!("http://localhost:{port}/mailbox/callback")),
            job_search_api_url: env::var("JOB_SEARCH_API_URL")
                .unwrap_or_else(|_| "https://jsearch.p.rapidapi.com".into()),
            job_search_api_key: env::var("JOB_SEARCH_API_KEY").unwrap_or_default(),
            scan_interval_secs: env::var("SCAN_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1800),
        }
    }
}
