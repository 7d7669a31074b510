//! Output formatting for prediction reports and artifact checks
//!
//! JSON and YAML render the serde schema verbatim for scripting; the human
//! format mirrors what the original questionnaire displayed after
//! submission.

use anyhow::{Context, Result};

use crate::artifacts::context::CheckReport;
use crate::report::schema::PredictionReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
    Yaml,
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format_report(&self, report: &PredictionReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(report)
                .context("Failed to serialize prediction report to JSON"),
            OutputFormat::Yaml => serde_yaml::to_string(report)
                .context("Failed to serialize prediction report to YAML"),
            OutputFormat::Human => Ok(format_report_human(report)),
        }
    }

    pub fn format_check(&self, report: &CheckReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(report)
                .context("Failed to serialize check report to JSON"),
            OutputFormat::Yaml => serde_yaml::to_string(report)
                .context("Failed to serialize check report to YAML"),
            OutputFormat::Human => Ok(format_check_human(report)),
        }
    }
}

fn format_report_human(report: &PredictionReport) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "Cholecystitis probability: {:.3} (threshold {:.2})\n",
        report.probability, report.threshold
    ));
    out.push_str(&format!("Verdict: {}\n", report.verdict.message()));

    if !report.top_features.is_empty() {
        out.push_str("\nTop contributing features:\n");
        for (i, feature) in report.top_features.iter().enumerate() {
            out.push_str(&format!(
                "  {}. {:<24} {:+.4}\n",
                i + 1,
                feature.feature,
                feature.contribution
            ));
        }
    }

    if !report.fallbacks.is_empty() {
        out.push_str("\nDefaults substituted:\n");
        for fallback in &report.fallbacks {
            if fallback.missing_default {
                out.push_str(&format!(
                    "  {} = {} (no default recorded)\n",
                    fallback.feature, fallback.value
                ));
            } else {
                out.push_str(&format!(
                    "  {} = {} (reference median)\n",
                    fallback.feature, fallback.value
                ));
            }
        }
    }

    out.push_str(&format!(
        "\nArtifacts: {} | generated {}\n",
        report.artifact_set,
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    out
}

fn format_check_human(report: &CheckReport) -> String {
    let mut out = String::new();
    for check in &report.checks {
        let mark = if check.passed { "ok" } else { "FAIL" };
        out.push_str(&format!("[{:>4}] {}: {}\n", mark, check.name, check.detail));
    }
    out.push_str(&format!(
        "\nArtifact set {}\n",
        if report.passed() { "is usable" } else { "has problems" }
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::context::CheckResult;
    use crate::assemble::pipeline::DefaultFallback;
    use crate::model::attribution::RankedFeature;
    use crate::report::schema::Verdict;
    use chrono::Utc;

    fn report() -> PredictionReport {
        PredictionReport {
            probability: 0.731,
            verdict: Verdict::Expected,
            threshold: 0.5,
            top_features: vec![
                RankedFeature {
                    feature: "bmi".to_string(),
                    contribution: 0.82,
                },
                RankedFeature {
                    feature: "fli_index".to_string(),
                    contribution: -0.31,
                },
            ],
            baseline: -0.2,
            fallbacks: vec![DefaultFallback {
                feature: "hsi_index".to_string(),
                value: 36.0,
                missing_default: false,
            }],
            artifact_set: "demo-v1".to_string(),
            generated_at: Utc::now(),
        }
    }

    #[test]
    fn test_human_report_mentions_key_facts() {
        let text = OutputFormatter::new(OutputFormat::Human)
            .format_report(&report())
            .unwrap();
        assert!(text.contains("0.731"));
        assert!(text.contains("cholecystitis is expected"));
        assert!(text.contains("bmi"));
        assert!(text.contains("+0.8200"));
        assert!(text.contains("hsi_index = 36 (reference median)"));
        assert!(text.contains("demo-v1"));
    }

    #[test]
    fn test_json_report_round_trips() {
        let text = OutputFormatter::new(OutputFormat::Json)
            .format_report(&report())
            .unwrap();
        let back: PredictionReport = serde_json::from_str(&text).unwrap();
        assert_eq!(back.probability, 0.731);
        assert_eq!(back.top_features.len(), 2);
    }

    #[test]
    fn test_yaml_report_serializes() {
        let text = OutputFormatter::new(OutputFormat::Yaml)
            .format_report(&report())
            .unwrap();
        assert!(text.contains("probability: 0.731"));
    }

    #[test]
    fn test_check_human_format() {
        let check = CheckReport {
            checks: vec![
                CheckResult {
                    name: "model.json".to_string(),
                    passed: true,
                    detail: "'demo', 40 trees, 17 features".to_string(),
                },
                CheckResult {
                    name: "defaults.json".to_string(),
                    passed: false,
                    detail: "artifact 'defaults.json' not found in ./artifacts".to_string(),
                },
            ],
        };
        let text = OutputFormatter::new(OutputFormat::Human)
            .format_check(&check)
            .unwrap();
        assert!(text.contains("[  ok] model.json"));
        assert!(text.contains("[FAIL] defaults.json"));
        assert!(text.contains("has problems"));
    }
}
