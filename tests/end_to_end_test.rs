//! End-to-end tests against the repository's demo artifact set
//!
//! Loads ./artifacts with the built-in 17-feature catalog and runs a full
//! submission from a fixture answers file, the same path the CLI takes.

use gallrisk::artifacts::{run_startup_checks, ModelContext};
use gallrisk::catalog::default_catalog;
use gallrisk::form::{AnswerSheet, FormDefinition};
use gallrisk::report::{run_submission, ReportOptions, Verdict};
use std::path::PathBuf;

fn artifacts_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("artifacts")
}

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

#[test]
fn test_demo_artifacts_pass_startup_checks() {
    let report = run_startup_checks(&artifacts_dir(), &default_catalog());
    assert!(report.passed(), "checks: {:?}", report.checks);
}

#[test]
fn test_demo_artifacts_digests_are_enforced_and_valid() {
    let ctx = ModelContext::load(&artifacts_dir(), default_catalog()).unwrap();
    assert_eq!(ctx.artifact_set(), "cholecystitis-demo-v1");
    assert_eq!(ctx.catalog().len(), 17);
}

#[test]
fn test_full_submission_from_answers_file() {
    let ctx = ModelContext::load(&artifacts_dir(), default_catalog()).unwrap();
    let form = FormDefinition::from_context(&ctx);

    let sheet = AnswerSheet::from_path(&fixture("patient.json")).unwrap();
    let record = sheet.to_record(&form).unwrap();

    let report = run_submission(&ctx, &record, &ReportOptions::default()).unwrap();

    assert!(report.probability > 0.0 && report.probability < 1.0);
    assert_eq!(report.top_features.len(), 5);
    assert_eq!(
        report.verdict,
        Verdict::from_probability(report.probability, 0.5)
    );

    // patient.json omits st_index and hsi_index, so exactly those two fall
    // back to the reference medians.
    let mut fallbacks: Vec<&str> = report
        .fallbacks
        .iter()
        .map(|f| f.feature.as_str())
        .collect();
    fallbacks.sort();
    assert_eq!(fallbacks, vec!["hsi_index", "st_index"]);
    assert!(report.fallbacks.iter().all(|f| !f.missing_default));
}

#[test]
fn test_submission_is_deterministic() {
    let ctx = ModelContext::load(&artifacts_dir(), default_catalog()).unwrap();
    let form = FormDefinition::from_context(&ctx);
    let sheet = AnswerSheet::from_path(&fixture("patient.json")).unwrap();
    let record = sheet.to_record(&form).unwrap();

    let opts = ReportOptions::default();
    let a = run_submission(&ctx, &record, &opts).unwrap();
    let b = run_submission(&ctx, &record, &opts).unwrap();

    assert_eq!(a.probability, b.probability);
    assert_eq!(a.top_features, b.top_features);
    assert_eq!(a.fallbacks, b.fallbacks);
}

#[test]
fn test_risk_factors_move_the_prediction_up() {
    let ctx = ModelContext::load(&artifacts_dir(), default_catalog()).unwrap();
    let form = FormDefinition::from_context(&ctx);

    // The fixture is a high-risk profile; an all-defaults submission with
    // benign categorical answers should score strictly lower.
    let high = AnswerSheet::from_path(&fixture("patient.json"))
        .unwrap()
        .to_record(&form)
        .unwrap();
    let low = AnswerSheet::from_json_str("{}").unwrap().to_record(&form).unwrap();

    let opts = ReportOptions::default();
    let high_report = run_submission(&ctx, &high, &opts).unwrap();
    let low_report = run_submission(&ctx, &low, &opts).unwrap();

    assert!(high_report.probability > low_report.probability);
}
