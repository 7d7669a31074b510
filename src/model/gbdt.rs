//! Artifact-backed gradient-boosted-tree classifier
//!
//! The model artifact is a JSON dump of additive regression trees exported
//! from the training pipeline. Nodes are stored in preorder with children
//! strictly after their parent, which makes traversal trivially terminating;
//! [`GbdtModel::validate`] enforces that along with index bounds.

use crate::model::classifier::{Classifier, ModelError};
use serde::{Deserialize, Serialize};

/// One node of a regression tree.
///
/// `cover` is the training sample weight that reached the node; optional in
/// the artifact and only consumed by the attribution engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cover: Option<f64>,
    },
    Leaf {
        value: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cover: Option<f64>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<TreeNode>,
}

impl Tree {
    /// Walks the row down to its leaf and returns the leaf value.
    pub fn leaf_value(&self, row: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                TreeNode::Leaf { value, .. } => return *value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    idx = if row[*feature] < *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }
}

/// A pre-trained boosted-tree binary classifier.
///
/// Probability is the logistic transform of `base_score` plus the sum of the
/// per-tree leaf values for the row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GbdtModel {
    pub name: String,
    #[serde(default)]
    pub version: String,
    pub n_features: usize,
    pub base_score: f64,
    pub trees: Vec<Tree>,
}

impl GbdtModel {
    /// Structural validation of a freshly deserialized artifact. Run once at
    /// load; traversal assumes it passed.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.n_features == 0 {
            return Err(ModelError::invalid("model declares zero features"));
        }
        if self.trees.is_empty() {
            return Err(ModelError::invalid("model contains no trees"));
        }

        for (t, tree) in self.trees.iter().enumerate() {
            if tree.nodes.is_empty() {
                return Err(ModelError::invalid(format!("tree {} is empty", t)));
            }
            for (i, node) in tree.nodes.iter().enumerate() {
                if let TreeNode::Split {
                    feature,
                    left,
                    right,
                    ..
                } = node
                {
                    if *feature >= self.n_features {
                        return Err(ModelError::invalid(format!(
                            "tree {} node {} splits on feature {} but model has {} features",
                            t, i, feature, self.n_features
                        )));
                    }
                    // Children after their parent keeps the walk acyclic.
                    if *left >= tree.nodes.len() || *right >= tree.nodes.len() {
                        return Err(ModelError::invalid(format!(
                            "tree {} node {} has a child index out of range",
                            t, i
                        )));
                    }
                    if *left <= i || *right <= i {
                        return Err(ModelError::invalid(format!(
                            "tree {} node {} has a child preceding its parent",
                            t, i
                        )));
                    }
                }
            }
        }

        Ok(())
    }

    /// Raw additive score in log-odds space.
    pub fn margin(&self, row: &[f64]) -> Result<f64, ModelError> {
        self.check_row(row)?;
        let sum: f64 = self.trees.iter().map(|tree| tree.leaf_value(row)).sum();
        Ok(self.base_score + sum)
    }

    fn check_row(&self, row: &[f64]) -> Result<(), ModelError> {
        if row.len() != self.n_features {
            return Err(ModelError::FeatureCountMismatch {
                expected: self.n_features,
                actual: row.len(),
            });
        }
        Ok(())
    }
}

impl Classifier for GbdtModel {
    fn predict_probability(&self, row: &[f64]) -> Result<f64, ModelError> {
        Ok(sigmoid(self.margin(row)?))
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn model_info(&self) -> Option<String> {
        Some(format!(
            "{} trees, base score {}",
            self.trees.len(),
            self.base_score
        ))
    }
}

pub(crate) fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}
