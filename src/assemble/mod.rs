//! Feature assembly: raw questionnaire input -> model-ready numeric row
//!
//! This is the one correctness-critical piece the crate owns. Everything it
//! consumes (catalog, category map, default table) is immutable after load,
//! and everything it produces is owned by a single submission.

pub mod pipeline;
pub mod record;

pub use pipeline::{assemble, AssembleError, AssembledVector, DefaultFallback};
pub use record::{FeatureInput, RawInputRecord, RawValue};
