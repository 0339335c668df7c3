// system-tests/tests/suites/delivery_contract.rs
// ============================================================================
// Module: Delivery Contract Tests
// Description: Secret deliveries served over HTTP by the target stub.
// Purpose: Ensure each discipline passes faithful and rejects altered data.
// Dependencies: system-tests helpers, lambda-secrets-harness
// ============================================================================

#![allow(
    clippy::missing_docs_in_private_items,
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::collections::BTreeMap;
use std::error::Error;
use std::time::Duration;

use helpers::reporting::reporter;
use helpers::spies::FixedPlanProvisioner;
use helpers::spies::plan_for;
use helpers::spies::sample_variables;
use helpers::target_stub::StubReply;
use helpers::target_stub::spawn_target_stub;
use lambda_secrets_harness::CheckFailure;
use lambda_secrets_harness::CheckId;
use lambda_secrets_harness::HttpTargetProbe;
use lambda_secrets_harness::PlanResult;
use lambda_secrets_harness::SessionFixture;
use lambda_secrets_harness::SuiteReport;
use lambda_secrets_harness::run_checks;
use serde_json::Value;

use crate::helpers;

type TestResult = Result<(), Box<dyn Error>>;

/// Serves the delivery for `variables`, altered by `alter`, and runs every check.
fn verify_delivery(
    variables: BTreeMap<String, Value>,
    alter: impl FnOnce(StubReply) -> StubReply,
) -> Result<SuiteReport, Box<dyn Error>> {
    let delivered = StubReply::delivering(&PlanResult::new(BTreeMap::new(), variables.clone()));
    let stub = spawn_target_stub(alter(delivered))?;
    let fixture = SessionFixture::new(
        FixedPlanProvisioner::new(plan_for(stub.url(), variables)),
        HttpTargetProbe::new(Duration::from_secs(5))?,
    );
    let report = run_checks(fixture.context()?);
    assert_eq!(stub.requests(), 1, "the target must be probed exactly once");
    Ok(report)
}

fn failed(report: &SuiteReport) -> Vec<CheckId> {
    report.failures().map(|outcome| outcome.check).collect()
}

fn failure(report: &SuiteReport, check: CheckId) -> CheckFailure {
    report.outcome(check).and_then(|outcome| outcome.failure.clone()).expect("check should fail")
}

fn with_variable(name: &str, value: &str) -> BTreeMap<String, Value> {
    let mut variables = sample_variables();
    variables.insert(name.to_string(), Value::String(value.to_string()));
    variables
}

#[test]
fn faithful_delivery_passes_every_check() -> TestResult {
    let mut reporter = reporter("faithful_delivery_passes_every_check")?;
    let report = verify_delivery(sample_variables(), |reply| reply)?;
    reporter.finish(&report)?;
    assert!(report.all_passed(), "{}", report.to_markdown());
    assert_eq!(report.outcomes().len(), 5);
    Ok(())
}

#[test]
fn plain_secret_hunter2_is_labelled_plain() -> TestResult {
    let report = verify_delivery(with_variable("secret-plain", "hunter2"), |reply| reply)?;
    assert!(report.outcome(CheckId::SecretPlain).unwrap().passed());
    Ok(())
}

#[test]
fn json_secret_tolerates_reformatting() -> TestResult {
    let report = verify_delivery(with_variable("secret-json", r#"{"a":1}"#), |reply| {
        reply.with_field("LAMBDASECRETS_JSON", r#"{"a": 1}"#)
    })?;
    assert!(report.all_passed(), "{}", report.to_markdown());
    Ok(())
}

#[test]
fn server_error_fails_connectivity_only() -> TestResult {
    let report = verify_delivery(sample_variables(), |reply| reply.with_status(500))?;
    assert_eq!(failed(&report), vec![CheckId::Connectivity]);
    assert_eq!(
        report.outcome(CheckId::Connectivity).unwrap().detail.as_deref(),
        Some("status mismatch: expected 200, actual 500")
    );
    Ok(())
}

#[test]
fn redirect_is_not_followed_and_fails_connectivity() -> TestResult {
    let report = verify_delivery(sample_variables(), |reply| reply.redirecting_to(302, "/"))?;
    assert_eq!(failed(&report), vec![CheckId::Connectivity]);
    assert_eq!(
        report.outcome(CheckId::Connectivity).unwrap().detail.as_deref(),
        Some("status mismatch: expected 200, actual 302")
    );
    Ok(())
}

#[test]
fn missing_binary_field_fails_only_the_binary_check() -> TestResult {
    let report = verify_delivery(sample_variables(), |reply| reply.without_field("LAMBDASECRETS_BINARY"))?;
    assert_eq!(failed(&report), vec![CheckId::SecretBinary]);
    assert_eq!(
        failure(&report, CheckId::SecretBinary),
        CheckFailure::MissingField {
            field: "LAMBDASECRETS_BINARY".to_string()
        }
    );
    Ok(())
}

#[test]
fn truncated_multiline_secret_is_a_mismatch() -> TestResult {
    let report = verify_delivery(sample_variables(), |reply| {
        reply.with_field("LAMBDASECRETS_MULTILINE", "-----BEGIN TEST KEY-----\n")
    })?;
    assert_eq!(failed(&report), vec![CheckId::SecretMultiline]);
    assert!(failure(&report, CheckId::SecretMultiline).is_mismatch());
    Ok(())
}

#[test]
fn normalized_line_endings_are_a_mismatch() -> TestResult {
    let report = verify_delivery(with_variable("secret-multiline", "a\nb\n"), |reply| {
        reply.with_field("LAMBDASECRETS_MULTILINE", "a\r\nb\r\n")
    })?;
    assert_eq!(failed(&report), vec![CheckId::SecretMultiline]);
    Ok(())
}

#[test]
fn wrong_kind_label_fails_with_kind_mismatch() -> TestResult {
    let report = verify_delivery(sample_variables(), |reply| {
        reply.with_field("LAMBDASECRETS_BINARY_TYPE", "PLAIN")
    })?;
    assert_eq!(failed(&report), vec![CheckId::SecretBinary]);
    assert!(matches!(failure(&report, CheckId::SecretBinary), CheckFailure::KindMismatch { .. }));
    Ok(())
}

#[test]
fn corrupted_json_secret_is_a_decode_failure() -> TestResult {
    let report = verify_delivery(sample_variables(), |reply| {
        reply.with_field("LAMBDASECRETS_JSON", r#"{"a":1,"nested":"#)
    })?;
    assert_eq!(failed(&report), vec![CheckId::SecretJson]);
    let failure = failure(&report, CheckId::SecretJson);
    assert!(matches!(failure, CheckFailure::Decode { .. }));
    assert!(!failure.is_mismatch());
    Ok(())
}

#[test]
fn non_json_body_fails_every_secret_check() -> TestResult {
    let delivered = StubReply::raw(200, "<html>gateway</html>");
    let stub = spawn_target_stub(delivered)?;
    let fixture = SessionFixture::new(
        FixedPlanProvisioner::new(plan_for(stub.url(), sample_variables())),
        HttpTargetProbe::new(Duration::from_secs(5))?,
    );
    let report = run_checks(fixture.context()?);
    assert_eq!(
        failed(&report),
        vec![
            CheckId::SecretPlain,
            CheckId::SecretJson,
            CheckId::SecretMultiline,
            CheckId::SecretBinary
        ]
    );
    assert!(matches!(failure(&report, CheckId::SecretPlain), CheckFailure::BodyDecode { .. }));
    Ok(())
}
