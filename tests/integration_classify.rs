use jobtrack_hub::classifier::{classify, company_key};
use jobtrack_hub::models::job::JobStatus;
use jobtrack_hub::models::update::Verdict;

#[test]
fn negative_takes_precedence_over_positive() {
    let c = classify(
        "Interview update",
        "Unfortunately we will not schedule an interview at this time",
        "hr@acme.io",
    );
    assert_eq!(c.verdict, Verdict::Negative);
    assert_eq!(c.suggested_status, Some(JobStatus::Rejected));
}

#[test]
fn neither_keyword_set_yields_none() {
    let c = classify(
        "Your weekly newsletter",
        "Here is what happened this week.",
        "news@letters.example.com",
    );
    assert_eq!(c.verdict, Verdict::None);
    assert_eq!(c.suggested_status, None);
}

#[test]
fn subject_alone_is_enough_for_a_verdict() {
    let c = classify("Interview invitation — Acme Corp", "", "hr@acme.io");
    assert_eq!(c.verdict, Verdict::Positive);
    assert_eq!(c.suggested_status, Some(JobStatus::Interviewing));
    assert_eq!(c.company_key, "acme");
}

#[test]
fn rejection_template_classifies_negative() {
    let c = classify(
        "Unfortunately, we have decided to move forward with other candidates",
        "",
        "talent@bigco.com",
    );
    assert_eq!(c.verdict, Verdict::Negative);
    assert_eq!(c.suggested_status, Some(JobStatus::Rejected));
}

#[test]
fn offer_suggests_offered_when_no_interview_talk() {
    let c = classify(
        "Your offer from Globex",
        "We are pleased to extend an offer.",
        "people@globex.com",
    );
    assert_eq!(c.verdict, Verdict::Positive);
    assert_eq!(c.suggested_status, Some(JobStatus::Offered));
}

#[test]
fn interview_outranks_offer_in_the_same_message() {
    let c = classify(
        "Offer discussion",
        "Let us schedule an interview to talk through the offer details.",
        "people@globex.com",
    );
    assert_eq!(c.suggested_status, Some(JobStatus::Interviewing));
}

#[test]
fn acknowledgment_suggests_no_status_change() {
    let c = classify(
        "Thanks for applying",
        "Congratulations on completing your application.",
        "noreply@initech.com",
    );
    assert_eq!(c.verdict, Verdict::Positive);
    assert_eq!(c.suggested_status, None);
}

#[test]
fn company_key_is_deterministic_and_lowercase() {
    assert_eq!(company_key("hr@acme.io"), "acme");
    assert_eq!(company_key("hr@acme.io"), company_key("hr@acme.io"));
    assert_eq!(company_key("HR Team <Recruiting@Acme.IO>"), "acme");
    assert_eq!(company_key("talent@sub.bigco.com"), "sub");
}

#[test]
fn company_key_falls_back_to_raw_sender() {
    assert_eq!(company_key("No Reply"), "no reply");
    assert_eq!(company_key(""), "");
}
