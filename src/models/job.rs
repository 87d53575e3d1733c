/// Tracked job models and the application status state machine
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Saved,
    Applied,
    Interviewing,
    Offered,
    Rejected,
}

impl JobStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "saved" => Some(Self::Saved),
            "applied" => Some(Self::Applied),
            "interviewing" => Some(Self::Interviewing),
            "offered" => Some(Self::Offered),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Saved => "saved",
            Self::Applied => "applied",
            Self::Interviewing => "interviewing",
            Self::Offered => "offered",
            Self::Rejected => "rejected",
        }
    }

    /// Terminal statuses are never left via the automatic reconcile path.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Offered | Self::Rejected)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TrackedJob {
    pub id: i64,
    pub owner: String,
    pub external_id: String,
    pub title: String,
    pub company_name: String,
    pub apply_link: String,
    pub location: Option<String>,
    pub status: JobStatus,
    pub date_added: i64,
    pub last_updated: i64,
}

impl<'r> sqlx::FromRow<'r, SqliteRow> for TrackedJob {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let status_raw: String = row.try_get("status")?;
        Ok(Self {
            id: row.try_get("id")?,
            owner: row.try_get("owner")?,
            external_id: row.try_get("external_id")?,
            title: row.try_get("title")?,
            company_name: row.try_get("company_name")?,
            apply_link: row.try_get("apply_link")?,
            location: row.try_get("location")?,
            status: JobStatus::parse(&status_raw).unwrap_or(JobStatus::Saved),
            date_added: row.try_get("date_added")?,
            last_updated: row.try_get("last_updated")?,
        })
    }
}

/// Payload for saving a listing into the tracked list.
#[derive(Debug, Clone, Deserialize)]
pub struct NewJob {
    pub external_id: String,
    pub title: String,
    pub company_name: String,
    #[serde(default)]
    pub apply_link: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub status: Option<JobStatus>,
}

/// One result row from the job-search provider. Transient; saving one
/// creates a TrackedJob.
#[derive(Debug, Clone, Serialize)]
pub struct JobListing {
    pub external_id: String,
    pub title: String,
    pub company_name: String,
    pub location: Option<String>,
    pub apply_link: Option<String>,
    pub description: Option<String>,
    pub date_posted: Option<String>,
}
