//! Prediction report schema and the submission flow
//!
//! [`run_submission`] is the whole per-request path: assemble the record,
//! classify, explain, rank. It either produces a complete report or fails
//! atomically — a classifier cannot accept a partially-filled row, so there
//! is no partial-result mode.

use crate::artifacts::context::ModelContext;
use crate::assemble::pipeline::{assemble, AssembleError, DefaultFallback};
use crate::assemble::record::RawInputRecord;
use crate::model::attribution::{rank_contributions, RankedFeature};
use crate::model::classifier::ModelError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

pub const DEFAULT_THRESHOLD: f64 = 0.5;
pub const DEFAULT_TOP_K: usize = 5;

#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error(transparent)]
    Assemble(#[from] AssembleError),

    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Classification of the probability against the decision threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Expected,
    NotExpected,
}

impl Verdict {
    pub fn from_probability(probability: f64, threshold: f64) -> Self {
        if probability >= threshold {
            Self::Expected
        } else {
            Self::NotExpected
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::Expected => "cholecystitis is expected",
            Self::NotExpected => "cholecystitis is not predicted",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ReportOptions {
    pub threshold: f64,
    pub top_k: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            top_k: DEFAULT_TOP_K,
        }
    }
}

/// Everything the presentation layer renders for one submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionReport {
    pub probability: f64,
    pub verdict: Verdict,
    pub threshold: f64,
    /// Top contributors by absolute attribution, catalog order on ties.
    pub top_features: Vec<RankedFeature>,
    /// Baseline margin the attributions are measured against.
    pub baseline: f64,
    /// Default substitutions that occurred during assembly.
    pub fallbacks: Vec<DefaultFallback>,
    pub artifact_set: String,
    pub generated_at: DateTime<Utc>,
}

/// Runs one submission end to end against the loaded context.
pub fn run_submission(
    ctx: &ModelContext,
    record: &RawInputRecord,
    opts: &ReportOptions,
) -> Result<PredictionReport, SubmissionError> {
    let assembled = assemble(ctx.catalog(), ctx.categories(), ctx.defaults(), record)?;

    let probability = ctx.classifier().predict_probability(assembled.values())?;
    let contributions = ctx.explainer().explain(assembled.values())?;
    let top_features = rank_contributions(ctx.catalog(), &contributions, opts.top_k)?;

    let verdict = Verdict::from_probability(probability, opts.threshold);
    info!(
        probability,
        threshold = opts.threshold,
        fallbacks = assembled.fallbacks().len(),
        "submission classified"
    );

    Ok(PredictionReport {
        probability,
        verdict,
        threshold: opts.threshold,
        top_features,
        baseline: ctx.explainer().expected_value(),
        fallbacks: assembled.fallbacks().to_vec(),
        artifact_set: ctx.artifact_set().to_string(),
        generated_at: Utc::now(),
    })
}
