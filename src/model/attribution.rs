//! Tree-path feature attribution and contribution ranking
//!
//! The explainer decomposes a boosted-tree prediction into one signed
//! contribution per feature by walking each tree's decision path and
//! crediting every split's change in expected value to the feature it split
//! on. Contributions sum to `margin - expected_value` exactly, so the
//! attribution is additively faithful to the model.

use crate::catalog::FeatureCatalog;
use crate::model::classifier::{AttributionEngine, ModelError};
use crate::model::gbdt::{GbdtModel, Tree, TreeNode};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::Arc;

/// Path-based attribution engine over a [`GbdtModel`].
///
/// Per-node expected values are precomputed once at construction: a leaf's
/// expectation is its value, a split's is the cover-weighted mean of its
/// children (unweighted when the artifact carries no cover).
pub struct TreePathExplainer {
    model: Arc<GbdtModel>,
    /// `expectations[t][i]` = expected value of tree `t` rooted at node `i`.
    expectations: Vec<Vec<f64>>,
    baseline: f64,
}

impl TreePathExplainer {
    pub fn new(model: Arc<GbdtModel>) -> Result<Self, ModelError> {
        model.validate()?;

        let expectations: Vec<Vec<f64>> = model
            .trees
            .iter()
            .map(|tree| node_expectations(tree))
            .collect();

        let baseline = model.base_score
            + expectations
                .iter()
                .map(|e| e.first().copied().unwrap_or(0.0))
                .sum::<f64>();

        Ok(Self {
            model,
            expectations,
            baseline,
        })
    }

    fn explain_tree(&self, t: usize, row: &[f64], contributions: &mut [f64]) {
        let tree = &self.model.trees[t];
        let expectations = &self.expectations[t];

        let mut idx = 0;
        loop {
            match &tree.nodes[idx] {
                TreeNode::Leaf { .. } => return,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    let child = if row[*feature] < *threshold {
                        *left
                    } else {
                        *right
                    };
                    contributions[*feature] += expectations[child] - expectations[idx];
                    idx = child;
                }
            }
        }
    }
}

impl AttributionEngine for TreePathExplainer {
    fn explain(&self, row: &[f64]) -> Result<Vec<f64>, ModelError> {
        if row.len() != self.model.n_features {
            return Err(ModelError::FeatureCountMismatch {
                expected: self.model.n_features,
                actual: row.len(),
            });
        }

        let mut contributions = vec![0.0; self.model.n_features];
        for t in 0..self.model.trees.len() {
            self.explain_tree(t, row, &mut contributions);
        }
        Ok(contributions)
    }

    fn expected_value(&self) -> f64 {
        self.baseline
    }

    fn name(&self) -> &str {
        "tree-path"
    }
}

/// Expected value and subtree weight per node, computed bottom-up. Children
/// come after their parent (validated), so a reverse pass suffices.
fn node_expectations(tree: &Tree) -> Vec<f64> {
    let n = tree.nodes.len();
    let mut expectation = vec![0.0; n];
    let mut weight = vec![0.0; n];

    for idx in (0..n).rev() {
        match &tree.nodes[idx] {
            TreeNode::Leaf { value, cover } => {
                expectation[idx] = *value;
                weight[idx] = cover.unwrap_or(1.0);
            }
            TreeNode::Split {
                left, right, cover, ..
            } => {
                let (wl, wr) = (weight[*left], weight[*right]);
                let total = wl + wr;
                expectation[idx] = if total > 0.0 {
                    (expectation[*left] * wl + expectation[*right] * wr) / total
                } else {
                    0.0
                };
                weight[idx] = cover.unwrap_or(total);
            }
        }
    }

    expectation
}

/// One entry of the ranked attribution list shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedFeature {
    pub feature: String,
    pub contribution: f64,
}

/// Top-`k` features by absolute contribution, sign preserved.
///
/// Ties break toward catalog order; the sort is stable so equal magnitudes
/// never swap. `k` larger than the catalog returns everything.
pub fn rank_contributions(
    catalog: &FeatureCatalog,
    contributions: &[f64],
    k: usize,
) -> Result<Vec<RankedFeature>, ModelError> {
    if contributions.len() != catalog.len() {
        return Err(ModelError::FeatureCountMismatch {
            expected: catalog.len(),
            actual: contributions.len(),
        });
    }

    let mut indexed: Vec<(usize, f64)> = contributions.iter().copied().enumerate().collect();
    indexed.sort_by(|a, b| {
        b.1.abs()
            .partial_cmp(&a.1.abs())
            .unwrap_or(Ordering::Equal)
    });

    Ok(indexed
        .into_iter()
        .take(k)
        .map(|(i, contribution)| RankedFeature {
            feature: catalog.ids()[i].clone(),
            contribution,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::classifier::Classifier;

    fn model() -> Arc<GbdtModel> {
        Arc::new(GbdtModel {
            name: "attr-test".to_string(),
            version: "1".to_string(),
            n_features: 3,
            base_score: 0.1,
            trees: vec![
                Tree {
                    nodes: vec![
                        TreeNode::Split {
                            feature: 0,
                            threshold: 1.0,
                            left: 1,
                            right: 2,
                            cover: Some(10.0),
                        },
                        TreeNode::Leaf {
                            value: -0.8,
                            cover: Some(5.0),
                        },
                        TreeNode::Split {
                            feature: 2,
                            threshold: 40.0,
                            left: 3,
                            right: 4,
                            cover: Some(5.0),
                        },
                        TreeNode::Leaf {
                            value: 0.2,
                            cover: Some(2.0),
                        },
                        TreeNode::Leaf {
                            value: 0.9,
                            cover: Some(3.0),
                        },
                    ],
                },
                Tree {
                    nodes: vec![
                        TreeNode::Split {
                            feature: 1,
                            threshold: 0.5,
                            left: 1,
                            right: 2,
                            cover: None,
                        },
                        TreeNode::Leaf {
                            value: -0.3,
                            cover: None,
                        },
                        TreeNode::Leaf {
                            value: 0.3,
                            cover: None,
                        },
                    ],
                },
            ],
        })
    }

    #[test]
    fn test_contributions_sum_to_margin_minus_baseline() {
        let model = model();
        let explainer = TreePathExplainer::new(Arc::clone(&model)).unwrap();

        for row in [
            vec![0.0, 0.0, 0.0],
            vec![2.0, 1.0, 50.0],
            vec![2.0, 0.0, 10.0],
        ] {
            let contributions = explainer.explain(&row).unwrap();
            let margin = model.margin(&row).unwrap();
            let sum: f64 = contributions.iter().sum();
            assert!(
                (sum - (margin - explainer.expected_value())).abs() < 1e-12,
                "row {:?}: sum {} vs margin {} baseline {}",
                row,
                sum,
                margin,
                explainer.expected_value()
            );
        }
    }

    #[test]
    fn test_untouched_feature_gets_zero_contribution() {
        let explainer = TreePathExplainer::new(model()).unwrap();
        // Row goes left at the root of tree 0, so feature 2's split is never
        // visited and it must receive exactly zero.
        let contributions = explainer.explain(&[0.0, 1.0, 99.0]).unwrap();
        assert_eq!(contributions[2], 0.0);
        assert!(contributions[0] < 0.0);
        assert!(contributions[1] > 0.0);
    }

    #[test]
    fn test_explain_enforces_row_length() {
        let explainer = TreePathExplainer::new(model()).unwrap();
        let err = explainer.explain(&[1.0]).unwrap_err();
        assert_eq!(
            err,
            ModelError::FeatureCountMismatch {
                expected: 3,
                actual: 1
            }
        );
    }

    #[test]
    fn test_explainer_rejects_invalid_model() {
        let mut broken = (*model()).clone();
        broken.trees.clear();
        assert!(TreePathExplainer::new(Arc::new(broken)).is_err());
    }

    #[test]
    fn test_probability_consistent_with_explained_margin() {
        let model = model();
        let explainer = TreePathExplainer::new(Arc::clone(&model)).unwrap();
        let row = [2.0, 1.0, 50.0];

        let contributions = explainer.explain(&row).unwrap();
        let rebuilt = explainer.expected_value() + contributions.iter().sum::<f64>();
        let p = model.predict_probability(&row).unwrap();
        assert!((p - 1.0 / (1.0 + (-rebuilt).exp())).abs() < 1e-12);
    }

    #[test]
    fn test_ranking_orders_by_magnitude_and_preserves_sign() {
        let catalog = FeatureCatalog::from_slice(&["a", "b", "c", "d"]);
        let ranked = rank_contributions(&catalog, &[0.1, -0.9, 0.4, -0.2], 3).unwrap();

        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].feature, "b");
        assert_eq!(ranked[0].contribution, -0.9);
        assert_eq!(ranked[1].feature, "c");
        assert_eq!(ranked[2].feature, "d");
    }

    #[test]
    fn test_ranking_breaks_ties_by_catalog_order() {
        let catalog = FeatureCatalog::from_slice(&["a", "b", "c"]);
        let ranked = rank_contributions(&catalog, &[-0.5, 0.5, 0.5], 3).unwrap();

        // Equal magnitudes keep catalog order: a before b before c.
        assert_eq!(ranked[0].feature, "a");
        assert_eq!(ranked[1].feature, "b");
        assert_eq!(ranked[2].feature, "c");
    }

    #[test]
    fn test_ranking_k_larger_than_catalog() {
        let catalog = FeatureCatalog::from_slice(&["a", "b"]);
        let ranked = rank_contributions(&catalog, &[0.0, 1.0], 10).unwrap();
        assert_eq!(ranked.len(), 2);
    }

    #[test]
    fn test_ranking_rejects_length_mismatch() {
        let catalog = FeatureCatalog::from_slice(&["a", "b"]);
        assert!(rank_contributions(&catalog, &[1.0], 2).is_err());
    }
}
