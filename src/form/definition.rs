//! Per-feature control specifications
//!
//! Derived from the model context: categorical features render as selects
//! over their label set, numeric features as bounded number inputs seeded
//! with the default-table value. Bounds are feature-specific where the
//! clinical range is known and a heuristic band around the default
//! otherwise.

use crate::artifacts::context::ModelContext;
use serde::{Deserialize, Serialize};

/// Half-width of the heuristic bounds band for numeric features without a
/// known clinical range.
const DEFAULT_SPREAD: f64 = 25.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ControlSpec {
    /// Fixed label list; the first label is the initial selection.
    Select { labels: Vec<String> },
    /// Bounded numeric input seeded with `initial`.
    Number { min: f64, max: f64, initial: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormField {
    pub feature: String,
    pub prompt: String,
    pub control: ControlSpec,
}

/// The rendered questionnaire, one field per catalog entry, in catalog order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormDefinition {
    fields: Vec<FormField>,
}

impl FormDefinition {
    pub fn from_context(ctx: &ModelContext) -> Self {
        Self::from_context_with_spread(ctx, DEFAULT_SPREAD)
    }

    pub fn from_context_with_spread(ctx: &ModelContext, spread: f64) -> Self {
        let fields = ctx
            .catalog()
            .iter()
            .map(|feature| {
                let control = match ctx.categories().get(feature) {
                    Some(codes) => ControlSpec::Select {
                        labels: codes.labels().map(str::to_string).collect(),
                    },
                    None => {
                        let initial = ctx.defaults().get(feature).unwrap_or(0.0);
                        let (min, max) = known_bounds(feature)
                            .unwrap_or_else(|| heuristic_bounds(initial, spread));
                        ControlSpec::Number { min, max, initial }
                    }
                };
                FormField {
                    feature: feature.to_string(),
                    prompt: prompt_for(feature).to_string(),
                    control,
                }
            })
            .collect();
        Self { fields }
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    pub fn field(&self, feature: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.feature == feature)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Clinically established input ranges for the questionnaire's numeric
/// features. Anything not listed gets the heuristic band.
fn known_bounds(feature: &str) -> Option<(f64, f64)> {
    match feature {
        "fibrosis_grade" => Some((0.0, 4.0)),
        "steatosis_grade" => Some((0.0, 3.0)),
        "st_index" => Some((0.0, 100.0)),
        "fli_index" => Some((0.0, 100.0)),
        "hsi_index" => Some((20.0, 70.0)),
        "bmi" => Some((10.0, 60.0)),
        "total_cholesterol" => Some((0.0, 20.0)),
        "triglycerides" => Some((0.0, 20.0)),
        _ => None,
    }
}

/// Band of `spread` around the default, floored at zero for non-negative
/// defaults (every catalog feature is a count, index or physical
/// measurement).
fn heuristic_bounds(initial: f64, spread: f64) -> (f64, f64) {
    let min = if initial >= 0.0 {
        (initial - spread).max(0.0)
    } else {
        initial - spread
    };
    (min, initial + spread)
}

fn prompt_for(feature: &str) -> &str {
    match feature {
        "fibrosis_grade" => "Fibrosis grade by elastometry",
        "psych_adaptation" => "Block 1: mental and social adaptation",
        "external_eating" => "External eating behavior type",
        "meal_frequency" => "Meals per day",
        "st_index" => "ST index (age, height, waist, diabetes)",
        "steatosis_grade" => "Steatosis grade by elastometry",
        "varied_diet" => "Varied diet",
        "heredity" => "Family history of hepatobiliary disease",
        "oda23_plus" => "ODA23+ score",
        "intrapsychic_response" => "Block 2: intrapsychic response to illness",
        "bmi" => "Body mass index",
        "total_cholesterol" => "Total cholesterol, mmol/L",
        "meal_gap" => "Gap between meals",
        "fli_index" => "FLI fatty liver index",
        "triglycerides" => "Triglycerides, mmol/L",
        "e_cigarettes" => "E-cigarette use",
        "hsi_index" => "HSI hepatic steatosis index",
        other => other,
    }
}
