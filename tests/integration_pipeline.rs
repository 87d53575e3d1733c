mod common;

use std::collections::HashSet;

use common::{connect_mailbox, message, test_pool, track_job, FakeMail};
use jobtrack_hub::models::job::JobStatus;
use jobtrack_hub::models::update::Verdict;
use jobtrack_hub::services::reconcile_service::company_matches;
use jobtrack_hub::services::scan_service::{self, ScanError};
use jobtrack_hub::services::{job_service, session_service, update_log_service};

const OWNER: &str = "default";

#[tokio::test]
async fn interview_email_moves_applied_job_to_interviewing() {
    let pool = test_pool().await;
    connect_mailbox(&pool, OWNER).await;
    let job_id = track_job(&pool, OWNER, "job-1", "Acme", JobStatus::Applied).await;

    let mail = FakeMail::with_messages(vec![message(
        "m1",
        "Interview invitation — Acme Corp",
        "hr@acme.io",
        "We would like to schedule a call.",
    )]);

    let report = scan_service::run_scan(&pool, &mail, OWNER).await.unwrap();

    assert_eq!(report.updates.len(), 1);
    let update = &report.updates[0];
    assert_eq!(update.verdict, Verdict::Positive);
    assert_eq!(update.company_key, "acme");
    assert_eq!(update.suggested_status, Some(JobStatus::Interviewing));
    assert_eq!(report.applied_count, 1);
    assert_eq!(report.touched_job_ids, vec![job_id]);

    let job = job_service::get_job(&pool, OWNER, job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Interviewing);
}

#[tokio::test]
async fn rejection_email_moves_job_to_rejected() {
    let pool = test_pool().await;
    connect_mailbox(&pool, OWNER).await;
    let job_id = track_job(&pool, OWNER, "job-1", "BigCo", JobStatus::Applied).await;

    let mail = FakeMail::with_messages(vec![message(
        "m1",
        "Unfortunately, we have decided to move forward with other candidates",
        "talent@bigco.com",
        "",
    )]);

    let report = scan_service::run_scan(&pool, &mail, OWNER).await.unwrap();
    assert_eq!(report.applied_count, 1);

    let job = job_service::get_job(&pool, OWNER, job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Rejected);
}

#[tokio::test]
async fn rescanning_the_same_email_is_a_noop() {
    let pool = test_pool().await;
    connect_mailbox(&pool, OWNER).await;
    let job_id = track_job(&pool, OWNER, "job-1", "Acme", JobStatus::Applied).await;

    let mail = FakeMail::with_messages(vec![message(
        "m1",
        "Interview invitation — Acme Corp",
        "hr@acme.io",
        "",
    )]);

    let first = scan_service::run_scan(&pool, &mail, OWNER).await.unwrap();
    assert_eq!(first.applied_count, 1);
    let after_first = job_service::get_job(&pool, OWNER, job_id).await.unwrap().unwrap();

    // Same still-present email seen again on the next pass.
    let second = scan_service::run_scan(&pool, &mail, OWNER).await.unwrap();
    assert_eq!(second.updates.len(), 1);
    assert_eq!(second.applied_count, 0);
    assert!(second.touched_job_ids.is_empty());

    let after_second = job_service::get_job(&pool, OWNER, job_id).await.unwrap().unwrap();
    assert_eq!(after_second.status, JobStatus::Interviewing);
    assert_eq!(after_second.last_updated, after_first.last_updated);
}

#[tokio::test]
async fn terminal_status_is_never_left_by_reconcile() {
    let pool = test_pool().await;
    connect_mailbox(&pool, OWNER).await;
    let offered = track_job(&pool, OWNER, "job-1", "Acme", JobStatus::Offered).await;
    let rejected = track_job(&pool, OWNER, "job-2", "Globex", JobStatus::Rejected).await;

    let mail = FakeMail::with_messages(vec![
        message("m1", "Unfortunately we went with other candidates", "hr@acme.io", ""),
        message("m2", "Interview invitation", "people@globex.com", ""),
    ]);

    let report = scan_service::run_scan(&pool, &mail, OWNER).await.unwrap();
    assert_eq!(report.applied_count, 0);

    let job1 = job_service::get_job(&pool, OWNER, offered).await.unwrap().unwrap();
    let job2 = job_service::get_job(&pool, OWNER, rejected).await.unwrap().unwrap();
    assert_eq!(job1.status, JobStatus::Offered);
    assert_eq!(job2.status, JobStatus::Rejected);
}

#[tokio::test]
async fn one_bad_message_does_not_fail_the_scan() {
    let pool = test_pool().await;
    connect_mailbox(&pool, OWNER).await;
    track_job(&pool, OWNER, "job-1", "Acme", JobStatus::Applied).await;

    let mut mail = FakeMail::with_messages(vec![
        message("m1", "Interview invitation", "hr@broken.example", ""),
        message("m2", "Interview invitation — Acme", "hr@acme.io", ""),
    ]);
    mail.fail_fetch_ids = HashSet::from(["m1".to_string()]);

    let report = scan_service::run_scan(&pool, &mail, OWNER).await.unwrap();
    assert_eq!(report.updates.len(), 1);
    assert_eq!(report.updates[0].company_key, "acme");
    assert_eq!(report.applied_count, 1);
}

#[tokio::test]
async fn listing_failure_fails_the_whole_scan() {
    let pool = test_pool().await;
    connect_mailbox(&pool, OWNER).await;

    let mail = FakeMail {
        fail_listing: true,
        ..Default::default()
    };

    let err = scan_service::run_scan(&pool, &mail, OWNER).await.unwrap_err();
    assert!(matches!(err, ScanError::Provider(_)));

    // Session survives a provider failure; retry happens on the next trigger.
    assert!(session_service::get_active_session(&pool, OWNER)
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn rejected_credential_deactivates_the_session() {
    let pool = test_pool().await;
    connect_mailbox(&pool, OWNER).await;

    let mail = FakeMail {
        reject_token: true,
        ..Default::default()
    };

    let err = scan_service::run_scan(&pool, &mail, OWNER).await.unwrap_err();
    assert!(matches!(err, ScanError::SessionExpired));
    assert!(session_service::get_active_session(&pool, OWNER)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn scan_without_a_session_is_unauthenticated() {
    let pool = test_pool().await;
    let mail = FakeMail::default();

    let err = scan_service::run_scan(&pool, &mail, OWNER).await.unwrap_err();
    assert!(matches!(err, ScanError::Unauthenticated));
}

#[tokio::test]
async fn updates_keep_listing_order() {
    let pool = test_pool().await;
    connect_mailbox(&pool, OWNER).await;

    let mail = FakeMail::with_messages(vec![
        message("m1", "Interview invitation", "hr@acme.io", ""),
        message("m2", "Unfortunately, other candidates", "talent@bigco.com", ""),
        message("m3", "Your offer", "people@globex.com", ""),
    ]);

    let report = scan_service::run_scan(&pool, &mail, OWNER).await.unwrap();
    let keys: Vec<_> = report.updates.iter().map(|u| u.company_key.as_str()).collect();
    assert_eq!(keys, vec!["acme", "bigco", "globex"]);
}

#[tokio::test]
async fn ambiguous_company_match_applies_to_all_matches() {
    let pool = test_pool().await;
    connect_mailbox(&pool, OWNER).await;
    let a = track_job(&pool, OWNER, "job-1", "Amazon", JobStatus::Applied).await;
    let b = track_job(&pool, OWNER, "job-2", "Amazon Web Services", JobStatus::Applied).await;

    let mail = FakeMail::with_messages(vec![message(
        "m1",
        "Interview invitation",
        "recruiting@amazon.com",
        "",
    )]);

    let report = scan_service::run_scan(&pool, &mail, OWNER).await.unwrap();
    assert_eq!(report.applied_count, 1);
    let touched: HashSet<i64> = report.touched_job_ids.iter().copied().collect();
    assert_eq!(touched, HashSet::from([a, b]));

    for id in [a, b] {
        let job = job_service::get_job(&pool, OWNER, id).await.unwrap().unwrap();
        assert_eq!(job.status, JobStatus::Interviewing);
    }
}

#[tokio::test]
async fn unmatched_updates_are_logged_but_not_applied() {
    let pool = test_pool().await;
    connect_mailbox(&pool, OWNER).await;
    track_job(&pool, OWNER, "job-1", "Acme", JobStatus::Applied).await;

    let mail = FakeMail::with_messages(vec![message(
        "m1",
        "Interview invitation",
        "hr@somewhere-else.io",
        "",
    )]);

    let report = scan_service::run_scan(&pool, &mail, OWNER).await.unwrap();
    assert_eq!(report.updates.len(), 1);
    assert_eq!(report.applied_count, 0);

    let history = update_log_service::history(&pool, OWNER, 10).await.unwrap();
    assert_eq!(history.len(), 1);
    assert!(!history[0].applied);
    assert_eq!(history[0].company_key, "somewhere-else");
}

#[tokio::test]
async fn neutral_messages_never_become_update_records() {
    let pool = test_pool().await;
    connect_mailbox(&pool, OWNER).await;

    let mail = FakeMail::with_messages(vec![message(
        "m1",
        "Your weekly digest",
        "news@letters.example.com",
        "Nothing job related here.",
    )]);

    let report = scan_service::run_scan(&pool, &mail, OWNER).await.unwrap();
    assert!(report.updates.is_empty());
    assert!(update_log_service::history(&pool, OWNER, 10)
        .await
        .unwrap()
        .is_empty());
}

#[test]
fn company_matching_is_substring_both_ways() {
    assert!(company_matches("Acme", "acme"));
    assert!(company_matches("Amazon Web Services", "amazon"));
    assert!(company_matches("amazon", "amazon web services"));
    assert!(!company_matches("Acme", "globex"));
    assert!(!company_matches("", "acme"));
    assert!(!company_matches("Acme", ""));
}
