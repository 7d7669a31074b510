use thiserror::Error;

/// Errors surfaced by the model collaborators.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    /// The presented row does not match the feature count the model was
    /// trained on.
    #[error("classifier expects {expected} features, got {actual}")]
    FeatureCountMismatch { expected: usize, actual: usize },

    /// The loaded artifact is structurally unusable (dangling node index,
    /// empty tree, feature index out of range).
    #[error("model artifact is unusable: {message}")]
    InvalidModel { message: String },

    #[error("{message}")]
    Other { message: String },
}

impl ModelError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidModel {
            message: message.into(),
        }
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }
}

/// The trained classifier, loaded once per process and read-only afterwards.
///
/// `predict_probability` takes a row in catalog column order and returns a
/// probability in `[0, 1]`.
pub trait Classifier: Send + Sync {
    fn predict_probability(&self, row: &[f64]) -> Result<f64, ModelError>;

    /// Number of features the model was trained on.
    fn n_features(&self) -> usize;

    fn name(&self) -> &str;

    fn model_info(&self) -> Option<String> {
        None
    }
}

/// Per-feature signed attribution for one assembled row.
///
/// `explain` returns one contribution per catalog feature, in catalog order.
/// Positive values push the prediction toward the condition, negative away
/// from it. Contributions are expressed in the model's margin (log-odds)
/// space, and `expected_value` is the baseline margin they are measured
/// against.
pub trait AttributionEngine: Send + Sync {
    fn explain(&self, row: &[f64]) -> Result<Vec<f64>, ModelError>;

    fn expected_value(&self) -> f64;

    fn name(&self) -> &str;
}
