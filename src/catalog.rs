//! Feature catalog and the lookup tables the assembly pipeline consumes
//!
//! The catalog fixes both the set of collected features and the exact column
//! order the trained classifier expects. That order is imposed by the model
//! artifact and cannot be verified locally; permuting it silently produces
//! wrong predictions, so the catalog is constructed once and never reordered.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Ordered, immutable list of feature identifiers.
///
/// Index `i` of an assembled vector always corresponds to `catalog[i]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCatalog {
    ids: Vec<String>,
}

impl FeatureCatalog {
    pub fn new(ids: Vec<String>) -> Self {
        Self { ids }
    }

    pub fn from_slice(ids: &[&str]) -> Self {
        Self {
            ids: ids.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Position of a feature in model column order.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.ids.iter().position(|f| f == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index_of(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Feature ids that appear more than once. Non-empty means the catalog
    /// is unusable; checked during context validation.
    pub fn duplicate_ids(&self) -> Vec<String> {
        let mut seen: HashMap<&str, usize> = HashMap::new();
        for id in self.iter() {
            *seen.entry(id).or_insert(0) += 1;
        }
        let mut dups: Vec<String> = seen
            .into_iter()
            .filter(|(_, n)| *n > 1)
            .map(|(id, _)| id.to_string())
            .collect();
        dups.sort();
        dups
    }
}

impl fmt::Display for FeatureCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} features: {}", self.ids.len(), self.ids.join(", "))
    }
}

/// Ordered label -> numeric code mapping for one categorical feature.
///
/// Label order is preserved because the first label doubles as the form
/// control's initial selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryCodes {
    codes: Vec<(String, f64)>,
}

impl CategoryCodes {
    pub fn new(codes: Vec<(String, f64)>) -> Self {
        Self { codes }
    }

    pub fn from_pairs(pairs: &[(&str, f64)]) -> Self {
        Self {
            codes: pairs.iter().map(|(l, c)| (l.to_string(), *c)).collect(),
        }
    }

    pub fn code_for(&self, label: &str) -> Option<f64> {
        self.codes
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, c)| *c)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.codes.iter().map(|(l, _)| l.as_str())
    }

    pub fn first_label(&self) -> Option<&str> {
        self.codes.first().map(|(l, _)| l.as_str())
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

/// Category lookup table for the categorical subset of the catalog.
///
/// A feature present here is categorical; one absent is numeric. Loaded once
/// from an artifact and treated as read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryMap {
    features: HashMap<String, CategoryCodes>,
}

impl CategoryMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<String>, codes: CategoryCodes) {
        self.features.insert(id.into(), codes);
    }

    pub fn with_feature(mut self, id: impl Into<String>, codes: CategoryCodes) -> Self {
        self.insert(id, codes);
        self
    }

    pub fn get(&self, id: &str) -> Option<&CategoryCodes> {
        self.features.get(id)
    }

    pub fn is_categorical(&self, id: &str) -> bool {
        self.features.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// Numeric fallback values (pre-computed medians over the reference dataset).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DefaultTable {
    values: HashMap<String, f64>,
}

impl DefaultTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<String>, value: f64) {
        self.values.insert(id.into(), value);
    }

    pub fn with_value(mut self, id: impl Into<String>, value: f64) -> Self {
        self.insert(id, value);
        self
    }

    pub fn get(&self, id: &str) -> Option<f64> {
        self.values.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.values.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// The 17-feature cholecystitis questionnaire catalog, in the exact order
/// the classifier was trained on.
pub fn default_catalog() -> FeatureCatalog {
    FeatureCatalog::from_slice(&[
        "fibrosis_grade",
        "psych_adaptation",
        "external_eating",
        "meal_frequency",
        "st_index",
        "steatosis_grade",
        "varied_diet",
        "heredity",
        "oda23_plus",
        "intrapsychic_response",
        "bmi",
        "total_cholesterol",
        "meal_gap",
        "fli_index",
        "triglycerides",
        "e_cigarettes",
        "hsi_index",
    ])
}
