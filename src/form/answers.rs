//! Answer-file ingestion
//!
//! A submission arrives as a flat JSON object mapping feature ids to either
//! a category label (string) or a numeric value. Converting it to a
//! [`RawInputRecord`] is where the explicitly-set flag gets decided, and the
//! two historical policies live side by side:
//!
//! - [`AnswerSheet::to_record`] implements the always-set policy: a present
//!   answer is explicit, an absent numeric answer means "no control was
//!   collected" and falls back to the default table. This never silently
//!   substitutes a value the user supplied.
//! - [`AnswerSheet::to_record_legacy`] reproduces the older value-equality
//!   policy (an answer numerically indistinguishable from the default is
//!   treated as unset). Kept only so historical submissions replay the way
//!   they originally scored.

use crate::assemble::record::{FeatureInput, RawInputRecord, RawValue};
use crate::catalog::DefaultTable;
use crate::form::definition::{ControlSpec, FormDefinition};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Tolerance for the legacy value-equality policy.
pub const LEGACY_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Error)]
pub enum FormError {
    #[error("failed to read answers file {}: {source}", .path.display())]
    AnswersIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("answers file is not a JSON object of feature answers: {message}")]
    AnswersParse { message: String },

    #[error("answers file refers to unknown feature '{feature}'")]
    UnknownFeature { feature: String },

    #[error("invalid answer for '{feature}': {message}")]
    InvalidAnswer { feature: String, message: String },

    #[error("interactive mode requires a terminal; pass --answers FILE instead")]
    NotInteractive,

    #[error("questionnaire aborted: {message}")]
    Aborted { message: String },

    #[error("terminal i/o failed: {source}")]
    Terminal {
        #[source]
        source: std::io::Error,
    },
}

/// Parsed answer file, keyed by feature id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnswerSheet {
    answers: BTreeMap<String, RawValue>,
}

impl AnswerSheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_path(path: &Path) -> Result<Self, FormError> {
        let raw = std::fs::read_to_string(path).map_err(|source| FormError::AnswersIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, FormError> {
        let value: serde_json::Value =
            serde_json::from_str(raw).map_err(|e| FormError::AnswersParse {
                message: e.to_string(),
            })?;

        let object = value.as_object().ok_or_else(|| FormError::AnswersParse {
            message: "top-level value must be an object".to_string(),
        })?;

        let mut answers = BTreeMap::new();
        for (feature, answer) in object {
            let raw_value = match answer {
                serde_json::Value::String(label) => RawValue::label(label.clone()),
                serde_json::Value::Number(n) => {
                    let v = n.as_f64().ok_or_else(|| FormError::InvalidAnswer {
                        feature: feature.clone(),
                        message: format!("{} is not representable as f64", n),
                    })?;
                    RawValue::number(v)
                }
                other => {
                    return Err(FormError::InvalidAnswer {
                        feature: feature.clone(),
                        message: format!("expected a label or a number, got {}", other),
                    })
                }
            };
            answers.insert(feature.clone(), raw_value);
        }

        Ok(Self { answers })
    }

    pub fn insert(&mut self, feature: impl Into<String>, value: RawValue) {
        self.answers.insert(feature.into(), value);
    }

    pub fn get(&self, feature: &str) -> Option<&RawValue> {
        self.answers.get(feature)
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    /// Always-set policy: present answers are explicit, absent ones fall
    /// back (numeric) or take the control's initial selection (categorical).
    pub fn to_record(&self, form: &FormDefinition) -> Result<RawInputRecord, FormError> {
        self.reject_unknown(form)?;

        let mut record = RawInputRecord::new();
        for field in form.fields() {
            let input = match (self.answers.get(&field.feature), &field.control) {
                (Some(value), _) => FeatureInput::explicit(value.clone()),
                (None, ControlSpec::Select { labels }) => {
                    // The rendered select always has a selection, so an
                    // uncollected categorical answer is the initial label.
                    debug!(feature = %field.feature, "categorical answer absent; using initial label");
                    FeatureInput::explicit(RawValue::label(labels[0].clone()))
                }
                (None, ControlSpec::Number { initial, .. }) => {
                    debug!(feature = %field.feature, "numeric answer absent; default table will fill it");
                    FeatureInput::seeded(RawValue::number(*initial))
                }
            };
            record.set(field.feature.clone(), input);
        }
        Ok(record)
    }

    /// Legacy value-equality policy: a numeric answer within `tolerance` of
    /// the feature's default is flagged as unset even though the user may
    /// have typed it deliberately.
    pub fn to_record_legacy(
        &self,
        form: &FormDefinition,
        defaults: &DefaultTable,
        tolerance: f64,
    ) -> Result<RawInputRecord, FormError> {
        self.reject_unknown(form)?;

        let mut record = RawInputRecord::new();
        for field in form.fields() {
            let input = match (self.answers.get(&field.feature), &field.control) {
                (Some(RawValue::Number(v)), ControlSpec::Number { .. }) => {
                    let explicit = match defaults.get(&field.feature) {
                        Some(default) => (v - default).abs() > tolerance,
                        None => true,
                    };
                    FeatureInput {
                        value: RawValue::number(*v),
                        explicit,
                    }
                }
                (Some(value), _) => FeatureInput::explicit(value.clone()),
                (None, ControlSpec::Select { labels }) => {
                    FeatureInput::explicit(RawValue::label(labels[0].clone()))
                }
                (None, ControlSpec::Number { initial, .. }) => {
                    FeatureInput::seeded(RawValue::number(*initial))
                }
            };
            record.set(field.feature.clone(), input);
        }
        Ok(record)
    }

    fn reject_unknown(&self, form: &FormDefinition) -> Result<(), FormError> {
        for feature in self.answers.keys() {
            if form.field(feature).is_none() {
                return Err(FormError::UnknownFeature {
                    feature: feature.clone(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::context::ModelContext;
    use crate::catalog::{CategoryCodes, CategoryMap, FeatureCatalog};
    use crate::model::mock::{MockClassifier, MockExplainer};
    use std::sync::Arc;

    fn form_and_defaults() -> (FormDefinition, DefaultTable) {
        let catalog = FeatureCatalog::from_slice(&["age_code", "bmi"]);
        let categories = CategoryMap::new().with_feature(
            "age_code",
            CategoryCodes::from_pairs(&[("young", 0.0), ("old", 1.0)]),
        );
        let defaults = DefaultTable::new().with_value("bmi", 24.5);
        let ctx = ModelContext::from_parts(
            catalog,
            categories,
            defaults.clone(),
            Arc::new(MockClassifier::new(2)),
            Arc::new(MockExplainer::new(2)),
            "test-set",
        )
        .unwrap();
        (FormDefinition::from_context(&ctx), defaults)
    }

    #[test]
    fn test_present_answers_are_explicit() {
        let (form, _) = form_and_defaults();
        let sheet =
            AnswerSheet::from_json_str(r#"{"age_code": "old", "bmi": 24.5}"#).unwrap();
        let record = sheet.to_record(&form).unwrap();

        // Policy B: the typed 24.5 stays explicit even though it equals the
        // default.
        assert!(record.get("bmi").unwrap().explicit);
        assert_eq!(record.get("bmi").unwrap().value, RawValue::Number(24.5));
        assert!(record.get("age_code").unwrap().explicit);
    }

    #[test]
    fn test_absent_numeric_answer_is_seeded_not_explicit() {
        let (form, _) = form_and_defaults();
        let sheet = AnswerSheet::from_json_str(r#"{"age_code": "young"}"#).unwrap();
        let record = sheet.to_record(&form).unwrap();

        assert!(!record.get("bmi").unwrap().explicit);
    }

    #[test]
    fn test_absent_categorical_answer_takes_initial_label() {
        let (form, _) = form_and_defaults();
        let sheet = AnswerSheet::from_json_str(r#"{"bmi": 31.0}"#).unwrap();
        let record = sheet.to_record(&form).unwrap();

        let input = record.get("age_code").unwrap();
        assert!(input.explicit);
        assert_eq!(input.value, RawValue::Label("young".to_string()));
    }

    #[test]
    fn test_legacy_policy_diverges_exactly_at_the_default() {
        let (form, defaults) = form_and_defaults();
        let sheet =
            AnswerSheet::from_json_str(r#"{"age_code": "old", "bmi": 24.5}"#).unwrap();

        let current = sheet.to_record(&form).unwrap();
        let legacy = sheet
            .to_record_legacy(&form, &defaults, LEGACY_TOLERANCE)
            .unwrap();

        assert!(current.get("bmi").unwrap().explicit);
        assert!(!legacy.get("bmi").unwrap().explicit);

        // Away from the default the two policies agree.
        let sheet = AnswerSheet::from_json_str(r#"{"bmi": 30.0}"#).unwrap();
        assert!(sheet.to_record(&form).unwrap().get("bmi").unwrap().explicit);
        assert!(sheet
            .to_record_legacy(&form, &defaults, LEGACY_TOLERANCE)
            .unwrap()
            .get("bmi")
            .unwrap()
            .explicit);
    }

    #[test]
    fn test_unknown_feature_is_rejected() {
        let (form, _) = form_and_defaults();
        let sheet = AnswerSheet::from_json_str(r#"{"weight": 80.0}"#).unwrap();
        let err = sheet.to_record(&form).unwrap_err();
        assert!(matches!(err, FormError::UnknownFeature { ref feature } if feature == "weight"));
    }

    #[test]
    fn test_non_scalar_answer_is_rejected() {
        let err = AnswerSheet::from_json_str(r#"{"bmi": [1, 2]}"#).unwrap_err();
        assert!(matches!(err, FormError::InvalidAnswer { .. }));
    }

    #[test]
    fn test_top_level_must_be_object() {
        let err = AnswerSheet::from_json_str("[1, 2]").unwrap_err();
        assert!(matches!(err, FormError::AnswersParse { .. }));
    }
}
