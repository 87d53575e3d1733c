/// Keyword classifier for recruiter emails. Pure and deterministic: no
/// state, no I/O, so it stays unit-testable away from the mail provider.
use crate::models::job::JobStatus;
use crate::models::update::Verdict;

/// Case-insensitive substring matches, not tokenized. A message counts as
/// positive only when it hits this set and misses the negative set.
const POSITIVE_KEYWORDS: &[&str] = &[
    "interview",
    "schedule",
    "offer",
    "congratulations",
    "next step",
    "pleased to",
    "excited to",
    "move forward",
];

/// Negative wins whenever both sets match.
const NEGATIVE_KEYWORDS: &[&str] = &[
    "unfortunately",
    "regret",
    "not selected",
    "other candidates",
    "no longer under consideration",
    "position has been filled",
    "not moving forward",
    "declined",
];

/// Subject terms sent to the mail provider as a server-side prefilter.
/// Only an optimization; classify() re-checks everything it returns.
pub const SUBJECT_HINTS: &[&str] = &[
    "interview",
    "offer",
    "application",
    "position",
    "candidate",
    "unfortunately",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub verdict: Verdict,
    pub company_key: String,
    pub suggested_status: Option<JobStatus>,
}

pub fn classify(subject: &str, body: &str, sender: &str) -> Classification {
    let haystack = format!("{} {}", subject.to_lowercase(), body.to_lowercase());

    let negative = NEGATIVE_KEYWORDS.iter().any(|k| haystack.contains(k));
    let positive = POSITIVE_KEYWORDS.iter().any(|k| haystack.contains(k));

    let (verdict, suggested_status) = if negative {
        (Verdict::Negative, Some(JobStatus::Rejected))
    } else if positive {
        (Verdict::Positive, suggest_positive_status(&haystack))
    } else {
        (Verdict::None, None)
    };

    Classification {
        verdict,
        company_key: company_key(sender),
        suggested_status,
    }
}

/// Interview talk outranks offer talk; a plain acknowledgment suggests
/// nothing and leaves the job where it is.
fn suggest_positive_status(haystack: &str) -> Option<JobStatus> {
    if haystack.contains("interview") || haystack.contains("schedule") {
        Some(JobStatus::Interviewing)
    } else if haystack.contains("offer") {
        Some(JobStatus::Offered)
    } else {
        None
    }
}

/// Normalized company token from a From header: the domain segment before
/// the first dot, lowercased. `HR <hr@acme.io>` -> "acme". Falls back to
/// the whole header lowercased when there is nothing after an '@'.
pub fn company_key(sender: &str) -> String {
    if let Some((_, domain)) = sender.rsplit_once('@') {
        let segment = domain
            .split(['.', '>', ' ', ','])
            .next()
            .unwrap_or_default();
        if !segment.is_empty() {
            return segment.to_lowercase();
        }
    }
    sender.to_lowercase()
}
