use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Raw per-feature input as collected from the form: either a selected
/// category label or a numeric magnitude.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Label(String),
    Number(f64),
}

impl RawValue {
    pub fn label(label: impl Into<String>) -> Self {
        Self::Label(label.into())
    }

    pub fn number(value: f64) -> Self {
        Self::Number(value)
    }
}

/// One collected answer plus the explicitly-set flag.
///
/// The flag is constructed deliberately by the caller (the form layer) and
/// never inferred here by comparing a value against its default. For numeric
/// features `explicit == false` means the default table wins during
/// assembly; for categorical features the label is always looked up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureInput {
    pub value: RawValue,
    pub explicit: bool,
}

impl FeatureInput {
    pub fn explicit(value: RawValue) -> Self {
        Self {
            value,
            explicit: true,
        }
    }

    pub fn seeded(value: RawValue) -> Self {
        Self {
            value,
            explicit: false,
        }
    }
}

/// One submission's worth of raw inputs, keyed by feature id.
///
/// Transient: created per form submission, consumed by [`assemble`] and
/// discarded. Never cached or shared across submissions.
///
/// [`assemble`]: crate::assemble::assemble
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawInputRecord {
    entries: HashMap<String, FeatureInput>,
}

impl RawInputRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an explicitly selected category label.
    pub fn with_label(mut self, id: impl Into<String>, label: impl Into<String>) -> Self {
        self.set(id, FeatureInput::explicit(RawValue::label(label)));
        self
    }

    /// Adds an explicitly entered numeric value.
    pub fn with_number(mut self, id: impl Into<String>, value: f64) -> Self {
        self.set(id, FeatureInput::explicit(RawValue::number(value)));
        self
    }

    /// Adds a numeric value the user never touched; assembly substitutes the
    /// default-table entry for it.
    pub fn with_seeded_number(mut self, id: impl Into<String>, value: f64) -> Self {
        self.set(id, FeatureInput::seeded(RawValue::number(value)));
        self
    }

    pub fn set(&mut self, id: impl Into<String>, input: FeatureInput) {
        self.entries.insert(id.into(), input);
    }

    pub fn get(&self, id: &str) -> Option<&FeatureInput> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
