//! Artifact loading and the process-wide model context
//!
//! The category map, default table and model are external artifacts of
//! unspecified provenance (statistical summaries of an unseen training set).
//! They are loaded once, verified against an optional digest manifest,
//! cross-checked against the feature catalog, and then frozen inside a
//! [`ModelContext`] that submissions borrow.

pub mod context;
pub mod loader;

pub use context::{run_startup_checks, CheckReport, CheckResult, ModelContext};
pub use loader::{
    load_category_map, load_default_table, load_manifest, load_model, ArtifactError, Manifest,
    CATEGORY_MAP_FILE, DEFAULT_TABLE_FILE, MANIFEST_FILE, MODEL_FILE,
};
