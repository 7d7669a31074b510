//! The feature-assembly pass
//!
//! Converts one [`RawInputRecord`] into the ordered numeric row the
//! classifier expects. Pure function of its four inputs; on error no partial
//! vector escapes. Range clamping is deliberately absent here: bounds policy
//! lives in the form layer, and any numeric value handed in is passed through
//! as-is.

use crate::assemble::record::{RawInputRecord, RawValue};
use crate::catalog::{CategoryCodes, CategoryMap, DefaultTable, FeatureCatalog};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Jaro-Winkler floor below which a near-miss label is not worth suggesting.
const SUGGESTION_THRESHOLD: f64 = 0.7;

/// Errors that abort a submission's assembly.
///
/// All are fatal for the submission: a guessed category code or a silently
/// zero-filled answer must never reach the classifier.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AssembleError {
    /// The selected label is not a recognized key for this categorical
    /// feature. Must never happen when the form only offers valid labels;
    /// this is the last line of defense before the value reaches the model.
    #[error("unknown label {label:?} for categorical feature '{feature}'{}", suggestion_suffix(.suggestion))]
    UnknownCategoryLabel {
        feature: String,
        label: String,
        /// Closest known label, for diagnostics only. Never used to recover.
        suggestion: Option<String>,
    },

    /// A catalog entry had no corresponding raw input at all. Indicates a
    /// form/catalog desynchronization bug.
    #[error("no input supplied for catalog feature '{feature}'")]
    MissingFeature { feature: String },

    /// A numeric feature received a label instead of a number.
    #[error("non-numeric input {label:?} for numeric feature '{feature}'")]
    NonNumericInput { feature: String, label: String },
}

fn suggestion_suffix(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(s) => format!(" (closest known label: {:?})", s),
        None => String::new(),
    }
}

/// Record of a default substitution that occurred during assembly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefaultFallback {
    pub feature: String,
    /// The value that went into the row in place of user input.
    pub value: f64,
    /// True when the default table itself had no entry and `0.0` was
    /// substituted. This shifts the model's input distribution and is
    /// additionally logged at WARN.
    pub missing_default: bool,
}

/// The assembled model row plus every substitution it took to build it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssembledVector {
    values: Vec<f64>,
    fallbacks: Vec<DefaultFallback>,
}

impl AssembledVector {
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn into_values(self) -> Vec<f64> {
        self.values
    }

    pub fn fallbacks(&self) -> &[DefaultFallback] {
        &self.fallbacks
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Assembles one submission into classifier column order.
///
/// Per feature, in catalog order:
/// 1. categorical (present in `categories`): the raw input is interpreted as
///    a label and translated through the feature's code map;
/// 2. numeric: the raw value is used as-is when explicitly set, otherwise
///    the default-table entry (or `0.0` if the table has none) is
///    substituted and recorded as a [`DefaultFallback`];
/// 3. a feature with no record entry aborts with
///    [`AssembleError::MissingFeature`].
pub fn assemble(
    catalog: &FeatureCatalog,
    categories: &CategoryMap,
    defaults: &DefaultTable,
    record: &RawInputRecord,
) -> Result<AssembledVector, AssembleError> {
    let mut values = Vec::with_capacity(catalog.len());
    let mut fallbacks = Vec::new();

    for feature in catalog.iter() {
        let input = record
            .get(feature)
            .ok_or_else(|| AssembleError::MissingFeature {
                feature: feature.to_string(),
            })?;

        let resolved = match categories.get(feature) {
            Some(codes) => resolve_categorical(feature, codes, &input.value)?,
            None => resolve_numeric(feature, defaults, input, &mut fallbacks)?,
        };

        values.push(resolved);
    }

    Ok(AssembledVector { values, fallbacks })
}

fn resolve_categorical(
    feature: &str,
    codes: &CategoryCodes,
    value: &RawValue,
) -> Result<f64, AssembleError> {
    // A numeric raw value for a categorical feature is still interpreted as
    // a label; it fails lookup like any other unrecognized selection.
    let label = match value {
        RawValue::Label(label) => label.clone(),
        RawValue::Number(n) => n.to_string(),
    };

    match codes.code_for(&label) {
        Some(code) => {
            debug!(feature, label = %label, code, "category label translated");
            Ok(code)
        }
        None => Err(AssembleError::UnknownCategoryLabel {
            feature: feature.to_string(),
            suggestion: closest_label(codes, &label),
            label,
        }),
    }
}

fn resolve_numeric(
    feature: &str,
    defaults: &DefaultTable,
    input: &crate::assemble::record::FeatureInput,
    fallbacks: &mut Vec<DefaultFallback>,
) -> Result<f64, AssembleError> {
    let raw = match &input.value {
        RawValue::Number(n) => *n,
        RawValue::Label(label) => {
            return Err(AssembleError::NonNumericInput {
                feature: feature.to_string(),
                label: label.clone(),
            })
        }
    };

    if input.explicit {
        debug!(feature, value = raw, "using explicit numeric input");
        return Ok(raw);
    }

    let value = match defaults.get(feature) {
        Some(default) => {
            debug!(feature, value = default, "substituting table default");
            fallbacks.push(DefaultFallback {
                feature: feature.to_string(),
                value: default,
                missing_default: false,
            });
            default
        }
        None => {
            warn!(
                feature,
                "feature absent from default table; substituting 0.0"
            );
            fallbacks.push(DefaultFallback {
                feature: feature.to_string(),
                value: 0.0,
                missing_default: true,
            });
            0.0
        }
    };

    Ok(value)
}

fn closest_label(codes: &CategoryCodes, label: &str) -> Option<String> {
    codes
        .labels()
        .map(|known| (known, strsim::jaro_winkler(known, label)))
        .filter(|(_, score)| *score >= SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(known, _)| known.to_string())
}
