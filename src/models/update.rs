use serde::{Deserialize, Serialize};

use crate::models::job::JobStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Positive,
    Negative,
    None,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::None => "none",
        }
    }
}

/// One classified mailbox signal. Produced by a scan, consumed once by the
/// reconciler, persisted append-only for history. Never mutated after
/// creation.
#[derive(Debug, Clone, Serialize)]
pub struct EmailUpdateRecord {
    pub company_key: String,
    pub verdict: Verdict,
    pub suggested_status: Option<JobStatus>,
    pub subject: String,
    pub sender: String,
    pub timestamp: i64,
}
