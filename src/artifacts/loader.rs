//! JSON artifact readers with optional digest verification
//!
//! Each loader is invoked once per process lifetime. There are no retries:
//! every failure here is deterministic and local, so the only useful
//! behavior is a precise error.

use crate::catalog::{CategoryCodes, CategoryMap, DefaultTable};
use crate::model::classifier::ModelError;
use crate::model::gbdt::GbdtModel;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

pub const CATEGORY_MAP_FILE: &str = "categories.json";
pub const DEFAULT_TABLE_FILE: &str = "defaults.json";
pub const MODEL_FILE: &str = "model.json";
pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("artifact '{name}' not found in {}", .dir.display())]
    Missing { name: String, dir: PathBuf },

    #[error("failed to read artifact '{name}': {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse artifact '{name}': {message}")]
    Parse { name: String, message: String },

    #[error("digest mismatch for artifact '{name}': manifest says {expected}, file is {actual}")]
    Checksum {
        name: String,
        expected: String,
        actual: String,
    },

    #[error("artifact set is inconsistent with the feature catalog: {message}")]
    Consistency { message: String },

    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Optional sidecar listing sha256 digests for the other artifacts. When
/// present, every listed digest is enforced before parsing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub name: String,
    #[serde(default)]
    pub artifacts: HashMap<String, String>,
}

pub fn load_manifest(dir: &Path) -> Result<Option<Manifest>, ArtifactError> {
    let path = dir.join(MANIFEST_FILE);
    let raw = match std::fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(dir = %dir.display(), "no artifact manifest; digests not enforced");
            return Ok(None);
        }
        Err(source) => {
            return Err(ArtifactError::Io {
                name: MANIFEST_FILE.to_string(),
                source,
            })
        }
    };

    let manifest: Manifest = serde_json::from_str(&raw).map_err(|e| ArtifactError::Parse {
        name: MANIFEST_FILE.to_string(),
        message: e.to_string(),
    })?;
    info!(set = %manifest.name, digests = manifest.artifacts.len(), "artifact manifest loaded");
    Ok(Some(manifest))
}

pub fn load_category_map(
    dir: &Path,
    manifest: Option<&Manifest>,
) -> Result<CategoryMap, ArtifactError> {
    #[derive(Deserialize)]
    struct FeatureDoc {
        id: String,
        codes: Vec<(String, f64)>,
    }
    #[derive(Deserialize)]
    struct CategoryMapDoc {
        features: Vec<FeatureDoc>,
    }

    let raw = read_verified(dir, CATEGORY_MAP_FILE, manifest)?;
    let doc: CategoryMapDoc = parse(CATEGORY_MAP_FILE, &raw)?;

    let mut map = CategoryMap::new();
    for feature in doc.features {
        map.insert(feature.id, CategoryCodes::new(feature.codes));
    }
    info!(categorical = map.len(), "category map loaded");
    Ok(map)
}

pub fn load_default_table(
    dir: &Path,
    manifest: Option<&Manifest>,
) -> Result<DefaultTable, ArtifactError> {
    #[derive(Deserialize)]
    struct DefaultsDoc {
        defaults: HashMap<String, f64>,
    }

    let raw = read_verified(dir, DEFAULT_TABLE_FILE, manifest)?;
    let doc: DefaultsDoc = parse(DEFAULT_TABLE_FILE, &raw)?;

    let mut table = DefaultTable::new();
    for (id, value) in doc.defaults {
        table.insert(id, value);
    }
    info!(defaults = table.len(), "default table loaded");
    Ok(table)
}

pub fn load_model(dir: &Path, manifest: Option<&Manifest>) -> Result<GbdtModel, ArtifactError> {
    let raw = read_verified(dir, MODEL_FILE, manifest)?;
    let model: GbdtModel = parse(MODEL_FILE, &raw)?;
    model.validate()?;
    info!(
        model = %model.name,
        trees = model.trees.len(),
        features = model.n_features,
        "classifier artifact loaded"
    );
    Ok(model)
}

fn read_verified(
    dir: &Path,
    name: &str,
    manifest: Option<&Manifest>,
) -> Result<String, ArtifactError> {
    let path = dir.join(name);
    let raw = std::fs::read_to_string(&path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ArtifactError::Missing {
                name: name.to_string(),
                dir: dir.to_path_buf(),
            }
        } else {
            ArtifactError::Io {
                name: name.to_string(),
                source: e,
            }
        }
    })?;

    if let Some(expected) = manifest.and_then(|m| m.artifacts.get(name)) {
        let actual = hex::encode(Sha256::digest(raw.as_bytes()));
        if !actual.eq_ignore_ascii_case(expected) {
            return Err(ArtifactError::Checksum {
                name: name.to_string(),
                expected: expected.clone(),
                actual,
            });
        }
        debug!(artifact = name, "digest verified");
    }

    Ok(raw)
}

fn parse<T: serde::de::DeserializeOwned>(name: &str, raw: &str) -> Result<T, ArtifactError> {
    serde_json::from_str(raw).map_err(|e| ArtifactError::Parse {
        name: name.to_string(),
        message: e.to_string(),
    })
}
