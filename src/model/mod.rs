//! Classifier and attribution collaborators
//!
//! The pipeline treats both the trained model and its attribution engine as
//! opaque collaborators behind traits. The concrete implementations here
//! evaluate a gradient-boosted-tree artifact and its tree-path attributions;
//! tests swap in the mocks.

pub mod attribution;
pub mod classifier;
pub mod gbdt;
pub mod mock;

pub use attribution::{rank_contributions, RankedFeature, TreePathExplainer};
pub use classifier::{AttributionEngine, Classifier, ModelError};
pub use gbdt::{GbdtModel, Tree, TreeNode};
pub use mock::{MockClassifier, MockExplainer};
