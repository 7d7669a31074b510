//! Integration tests using the mock classifier/explainer for the
//! submission flow
//!
//! These verify the predict path without a real model artifact.

use gallrisk::artifacts::ModelContext;
use gallrisk::assemble::RawInputRecord;
use gallrisk::catalog::{CategoryCodes, CategoryMap, DefaultTable, FeatureCatalog};
use gallrisk::model::{MockClassifier, MockExplainer, ModelError};
use gallrisk::report::{run_submission, ReportOptions, Verdict};
use std::sync::Arc;

fn context_with(classifier: MockClassifier, explainer: MockExplainer) -> ModelContext {
    let catalog = FeatureCatalog::from_slice(&["heredity", "bmi", "fli_index"]);
    let categories = CategoryMap::new().with_feature(
        "heredity",
        CategoryCodes::from_pairs(&[("none", 0.0), ("gallstones", 2.0)]),
    );
    let defaults = DefaultTable::new()
        .with_value("bmi", 26.4)
        .with_value("fli_index", 42.0);

    ModelContext::from_parts(
        catalog,
        categories,
        defaults,
        Arc::new(classifier),
        Arc::new(explainer),
        "mock-set",
    )
    .unwrap()
}

fn full_record() -> RawInputRecord {
    RawInputRecord::new()
        .with_label("heredity", "gallstones")
        .with_number("bmi", 31.0)
        .with_seeded_number("fli_index", 42.0)
}

#[test]
fn test_submission_flow_with_mocks() {
    let classifier = MockClassifier::new(3);
    classifier.push_probability(0.74);
    let explainer = MockExplainer::with_baseline(3, -0.4);
    explainer.push_contributions(vec![0.6, 0.9, -0.2]);

    let ctx = context_with(classifier, explainer);
    let report = run_submission(&ctx, &full_record(), &ReportOptions::default()).unwrap();

    assert_eq!(report.probability, 0.74);
    assert_eq!(report.verdict, Verdict::Expected);
    assert_eq!(report.baseline, -0.4);
    assert_eq!(report.artifact_set, "mock-set");

    // bmi (0.9) outranks heredity (0.6) outranks fli_index (0.2).
    let order: Vec<&str> = report
        .top_features
        .iter()
        .map(|f| f.feature.as_str())
        .collect();
    assert_eq!(order, vec!["bmi", "heredity", "fli_index"]);

    // The seeded fli_index shows up as a default substitution.
    assert_eq!(report.fallbacks.len(), 1);
    assert_eq!(report.fallbacks[0].feature, "fli_index");
    assert_eq!(report.fallbacks[0].value, 42.0);
}

#[test]
fn test_top_k_truncates_ranking() {
    let classifier = MockClassifier::new(3);
    classifier.push_probability(0.2);
    let explainer = MockExplainer::new(3);
    explainer.push_contributions(vec![0.1, 0.2, 0.3]);

    let ctx = context_with(classifier, explainer);
    let opts = ReportOptions {
        top_k: 1,
        ..Default::default()
    };
    let report = run_submission(&ctx, &full_record(), &opts).unwrap();

    assert_eq!(report.top_features.len(), 1);
    assert_eq!(report.top_features[0].feature, "fli_index");
    assert_eq!(report.verdict, Verdict::NotExpected);
}

#[test]
fn test_bad_label_fails_before_the_model_is_consulted() {
    let classifier = Arc::new(MockClassifier::new(3));
    classifier.push_probability(0.9);
    let classifier_handle = Arc::clone(&classifier);
    let explainer = MockExplainer::new(3);
    explainer.push_contributions(vec![0.0, 0.0, 0.0]);

    let catalog = FeatureCatalog::from_slice(&["heredity", "bmi", "fli_index"]);
    let categories = CategoryMap::new().with_feature(
        "heredity",
        CategoryCodes::from_pairs(&[("none", 0.0), ("gallstones", 2.0)]),
    );
    let defaults = DefaultTable::new()
        .with_value("bmi", 26.4)
        .with_value("fli_index", 42.0);
    let ctx = ModelContext::from_parts(
        catalog,
        categories,
        defaults,
        classifier,
        Arc::new(explainer),
        "mock-set",
    )
    .unwrap();

    let record = RawInputRecord::new()
        .with_label("heredity", "unknown-option")
        .with_number("bmi", 31.0)
        .with_number("fli_index", 60.0);

    assert!(run_submission(&ctx, &record, &ReportOptions::default()).is_err());

    // Assembly failed first, so the mock's scripted response is untouched.
    assert_eq!(classifier_handle.remaining_responses(), 1);
}

#[test]
fn test_explainer_error_propagates() {
    let classifier = MockClassifier::new(3);
    classifier.push_probability(0.5);
    let explainer = MockExplainer::new(3);
    explainer.push_error(ModelError::other("attribution unavailable"));

    let ctx = context_with(classifier, explainer);
    let err = run_submission(&ctx, &full_record(), &ReportOptions::default()).unwrap_err();
    assert!(err.to_string().contains("attribution unavailable"));
}

#[test]
fn test_context_rejects_mismatched_mock() {
    let catalog = FeatureCatalog::from_slice(&["bmi"]);
    let defaults = DefaultTable::new().with_value("bmi", 26.4);

    let result = ModelContext::from_parts(
        catalog,
        CategoryMap::new(),
        defaults,
        Arc::new(MockClassifier::new(5)),
        Arc::new(MockExplainer::new(5)),
        "mock-set",
    );
    assert!(result.is_err());
}
