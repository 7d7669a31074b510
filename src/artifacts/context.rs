//! The immutable per-process model context
//!
//! Replaces the original's lazily-initialized module globals: everything a
//! submission needs is loaded once, cross-checked, and passed by reference.

use crate::artifacts::loader::{
    self, ArtifactError, CATEGORY_MAP_FILE, DEFAULT_TABLE_FILE, MODEL_FILE,
};
use crate::catalog::{CategoryMap, DefaultTable, FeatureCatalog};
use crate::model::attribution::TreePathExplainer;
use crate::model::classifier::{AttributionEngine, Classifier};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Everything a submission borrows: catalog, lookup tables, classifier and
/// attribution engine. Constructed once at startup, never mutated.
pub struct ModelContext {
    catalog: FeatureCatalog,
    categories: CategoryMap,
    defaults: DefaultTable,
    classifier: Arc<dyn Classifier>,
    explainer: Arc<dyn AttributionEngine>,
    artifact_set: String,
}

impl ModelContext {
    /// Loads all artifacts from `dir` and validates the assembled context.
    pub fn load(dir: &Path, catalog: FeatureCatalog) -> Result<Self, ArtifactError> {
        let manifest = loader::load_manifest(dir)?;
        let categories = loader::load_category_map(dir, manifest.as_ref())?;
        let defaults = loader::load_default_table(dir, manifest.as_ref())?;
        let model = Arc::new(loader::load_model(dir, manifest.as_ref())?);
        let explainer = TreePathExplainer::new(Arc::clone(&model))?;

        let artifact_set = manifest
            .map(|m| m.name)
            .or_else(|| {
                dir.file_name()
                    .map(|n| n.to_string_lossy().into_owned())
            })
            .unwrap_or_else(|| "unnamed".to_string());

        Self::from_parts(
            catalog,
            categories,
            defaults,
            model,
            Arc::new(explainer),
            artifact_set,
        )
    }

    /// Assembles a context from already-built parts (tests use this with the
    /// mocks) and runs the startup consistency check.
    pub fn from_parts(
        catalog: FeatureCatalog,
        categories: CategoryMap,
        defaults: DefaultTable,
        classifier: Arc<dyn Classifier>,
        explainer: Arc<dyn AttributionEngine>,
        artifact_set: impl Into<String>,
    ) -> Result<Self, ArtifactError> {
        let ctx = Self {
            catalog,
            categories,
            defaults,
            classifier,
            explainer,
            artifact_set: artifact_set.into(),
        };
        ctx.validate()?;
        info!(
            set = %ctx.artifact_set,
            features = ctx.catalog.len(),
            "model context ready"
        );
        Ok(ctx)
    }

    /// Startup consistency check: the surrounding system only asserts that
    /// the artifacts match the catalog, so we verify it before accepting
    /// submissions.
    pub fn validate(&self) -> Result<(), ArtifactError> {
        if self.catalog.is_empty() {
            return Err(ArtifactError::Consistency {
                message: "feature catalog is empty".to_string(),
            });
        }

        let dups = self.catalog.duplicate_ids();
        if !dups.is_empty() {
            return Err(ArtifactError::Consistency {
                message: format!("duplicate catalog ids: {}", dups.join(", ")),
            });
        }

        for feature in self.catalog.iter() {
            match self.categories.get(feature) {
                Some(codes) if codes.is_empty() => {
                    return Err(ArtifactError::Consistency {
                        message: format!("categorical feature '{}' has no labels", feature),
                    });
                }
                Some(_) => {
                    if self.defaults.contains(feature) {
                        // Harmless (the default is never consulted for a
                        // categorical feature) but worth surfacing.
                        warn!(feature, "feature is categorical yet has a default entry");
                    }
                }
                None => {
                    if !self.defaults.contains(feature) {
                        return Err(ArtifactError::Consistency {
                            message: format!(
                                "numeric feature '{}' has no default-table entry",
                                feature
                            ),
                        });
                    }
                }
            }
        }

        if self.classifier.n_features() != self.catalog.len() {
            return Err(ArtifactError::Consistency {
                message: format!(
                    "classifier expects {} features but the catalog has {}",
                    self.classifier.n_features(),
                    self.catalog.len()
                ),
            });
        }

        Ok(())
    }

    pub fn catalog(&self) -> &FeatureCatalog {
        &self.catalog
    }

    pub fn categories(&self) -> &CategoryMap {
        &self.categories
    }

    pub fn defaults(&self) -> &DefaultTable {
        &self.defaults
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    pub fn explainer(&self) -> &dyn AttributionEngine {
        self.explainer.as_ref()
    }

    pub fn artifact_set(&self) -> &str {
        &self.artifact_set
    }
}

impl std::fmt::Debug for ModelContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelContext")
            .field("artifact_set", &self.artifact_set)
            .field("features", &self.catalog.len())
            .field("classifier", &self.classifier.name())
            .finish()
    }
}

/// Outcome of one startup check, named so `check` output stays scriptable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    pub name: String,
    pub passed: bool,
    pub detail: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckReport {
    pub checks: Vec<CheckResult>,
}

impl CheckReport {
    pub fn passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    fn push(&mut self, name: &str, result: Result<String, String>) {
        let (passed, detail) = match result {
            Ok(detail) => (true, detail),
            Err(detail) => (false, detail),
        };
        self.checks.push(CheckResult {
            name: name.to_string(),
            passed,
            detail,
        });
    }
}

/// Runs every load step individually so a broken artifact set reports all
/// of its problems at once instead of the first one.
pub fn run_startup_checks(dir: &Path, catalog: &FeatureCatalog) -> CheckReport {
    let mut report = CheckReport::default();

    let manifest = match loader::load_manifest(dir) {
        Ok(Some(m)) => {
            report.push(
                "manifest",
                Ok(format!("set '{}', {} digests", m.name, m.artifacts.len())),
            );
            Some(m)
        }
        Ok(None) => {
            report.push("manifest", Ok("absent; digests not enforced".to_string()));
            None
        }
        Err(e) => {
            report.push("manifest", Err(e.to_string()));
            None
        }
    };

    let categories = match loader::load_category_map(dir, manifest.as_ref()) {
        Ok(map) => {
            report.push(
                CATEGORY_MAP_FILE,
                Ok(format!("{} categorical features", map.len())),
            );
            Some(map)
        }
        Err(e) => {
            report.push(CATEGORY_MAP_FILE, Err(e.to_string()));
            None
        }
    };

    let defaults = match loader::load_default_table(dir, manifest.as_ref()) {
        Ok(table) => {
            report.push(DEFAULT_TABLE_FILE, Ok(format!("{} defaults", table.len())));
            Some(table)
        }
        Err(e) => {
            report.push(DEFAULT_TABLE_FILE, Err(e.to_string()));
            None
        }
    };

    let model = match loader::load_model(dir, manifest.as_ref()) {
        Ok(model) => {
            report.push(
                MODEL_FILE,
                Ok(format!(
                    "'{}', {} trees, {} features",
                    model.name,
                    model.trees.len(),
                    model.n_features
                )),
            );
            Some(model)
        }
        Err(e) => {
            report.push(MODEL_FILE, Err(e.to_string()));
            None
        }
    };

    if let (Some(categories), Some(defaults), Some(model)) = (categories, defaults, model) {
        let model = Arc::new(model);
        let outcome = TreePathExplainer::new(Arc::clone(&model))
            .map_err(ArtifactError::from)
            .and_then(|explainer| {
                ModelContext::from_parts(
                    catalog.clone(),
                    categories,
                    defaults,
                    model,
                    Arc::new(explainer),
                    "check",
                )
            });
        match outcome {
            Ok(_) => report.push(
                "catalog_consistency",
                Ok(format!("all {} catalog features covered", catalog.len())),
            ),
            Err(e) => report.push("catalog_consistency", Err(e.to_string())),
        }
    }

    report
}
