//! gallrisk - questionnaire-driven cholecystitis risk prediction
//!
//! This library collects a fixed 17-feature clinical questionnaire, turns
//! the answers into the exact numeric row a pre-trained gradient-boosted
//! classifier expects, and reports the predicted probability together with
//! a ranked feature attribution.
//!
//! # Core Concepts
//!
//! - **Feature Catalog**: the ordered feature list; its order is the model's
//!   trained column order and must never be permuted
//! - **Feature Assembly**: the deterministic translation of raw answers into
//!   the model row, including category-code lookup and default substitution
//! - **Model Context**: category map, default table, classifier and
//!   attribution engine, loaded once from artifacts and passed by reference
//!
//! # Example Usage
//!
//! ```ignore
//! use gallrisk::artifacts::ModelContext;
//! use gallrisk::assemble::RawInputRecord;
//! use gallrisk::catalog::default_catalog;
//! use gallrisk::report::{run_submission, ReportOptions};
//! use std::path::Path;
//!
//! fn predict_one() -> Result<(), Box<dyn std::error::Error>> {
//!     let ctx = ModelContext::load(Path::new("artifacts"), default_catalog())?;
//!
//!     let record = RawInputRecord::new()
//!         .with_label("heredity", "gallstones")
//!         .with_number("bmi", 31.2);
//!     // ...one entry per catalog feature...
//!
//!     let report = run_submission(&ctx, &record, &ReportOptions::default())?;
//!     println!("probability: {:.3}", report.probability);
//!     Ok(())
//! }
//! ```
//!
//! # Project Structure
//!
//! - [`catalog`]: feature catalog and lookup-table types
//! - [`assemble`]: the feature-assembly pipeline
//! - [`model`]: classifier/attribution traits, the GBDT artifact model, mocks
//! - [`artifacts`]: artifact loading, digest verification, model context
//! - [`form`]: answer ingestion, bounds policy, terminal questionnaire
//! - [`report`]: the per-submission flow and its output schema
//! - [`cli`]: command-line interface

// Public modules
pub mod artifacts;
pub mod assemble;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod form;
pub mod model;
pub mod report;

// Re-export key types for convenient access
pub use artifacts::{ArtifactError, ModelContext};
pub use assemble::{assemble, AssembleError, AssembledVector, RawInputRecord, RawValue};
pub use catalog::{default_catalog, CategoryMap, DefaultTable, FeatureCatalog};
pub use model::{AttributionEngine, Classifier, GbdtModel, ModelError, TreePathExplainer};
pub use report::{run_submission, PredictionReport, ReportOptions};

/// Crate version, reported by the CLI at startup.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
