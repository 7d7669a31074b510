use crate::model::classifier::{AttributionEngine, Classifier, ModelError};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Scripted classifier for tests: pops one queued response per call and
/// errors when the queue runs dry.
pub struct MockClassifier {
    responses: Mutex<VecDeque<Result<f64, ModelError>>>,
    n_features: usize,
    name: String,
}

impl MockClassifier {
    pub fn new(n_features: usize) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            n_features,
            name: "MockClassifier".to_string(),
        }
    }

    pub fn with_name(n_features: usize, name: impl Into<String>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            n_features,
            name: name.into(),
        }
    }

    pub fn push_probability(&self, probability: f64) {
        self.responses.lock().unwrap().push_back(Ok(probability));
    }

    pub fn push_error(&self, error: ModelError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    pub fn remaining_responses(&self) -> usize {
        self.responses.lock().unwrap().len()
    }
}

impl Classifier for MockClassifier {
    fn predict_probability(&self, row: &[f64]) -> Result<f64, ModelError> {
        if row.len() != self.n_features {
            return Err(ModelError::FeatureCountMismatch {
                expected: self.n_features,
                actual: row.len(),
            });
        }
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(ModelError::other(
                    "MockClassifier: no more responses in queue",
                ))
            })
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn model_info(&self) -> Option<String> {
        Some("mock-model".to_string())
    }
}

impl std::fmt::Debug for MockClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockClassifier")
            .field("name", &self.name)
            .field("n_features", &self.n_features)
            .field("remaining_responses", &self.remaining_responses())
            .finish()
    }
}

/// Scripted attribution engine: returns queued contribution vectors.
pub struct MockExplainer {
    responses: Mutex<VecDeque<Result<Vec<f64>, ModelError>>>,
    n_features: usize,
    baseline: f64,
}

impl MockExplainer {
    pub fn new(n_features: usize) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            n_features,
            baseline: 0.0,
        }
    }

    pub fn with_baseline(n_features: usize, baseline: f64) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            n_features,
            baseline,
        }
    }

    pub fn push_contributions(&self, contributions: Vec<f64>) {
        self.responses.lock().unwrap().push_back(Ok(contributions));
    }

    pub fn push_error(&self, error: ModelError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    pub fn remaining_responses(&self) -> usize {
        self.responses.lock().unwrap().len()
    }
}

impl AttributionEngine for MockExplainer {
    fn explain(&self, row: &[f64]) -> Result<Vec<f64>, ModelError> {
        if row.len() != self.n_features {
            return Err(ModelError::FeatureCountMismatch {
                expected: self.n_features,
                actual: row.len(),
            });
        }
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(ModelError::other(
                    "MockExplainer: no more responses in queue",
                ))
            })
    }

    fn expected_value(&self) -> f64 {
        self.baseline
    }

    fn name(&self) -> &str {
        "MockExplainer"
    }
}
