//! Output reporters for cvssx evaluation results
//!
//! Supports multiple output formats:
//! - `text` - Terminal output with colors
//! - `json` - Machine-readable JSON
//! - `markdown` - GitHub-flavored Markdown audit trail

mod json;
mod markdown;
mod text;

use crate::models::{RuleSet, Severity, BOOL_FALSE, BOOL_TRUE};
use crate::scoring::{ComboStatus, EvaluationResult};
use crate::vector::ExtensionVector;
use anyhow::{anyhow, Result};
use serde::Serialize;
use std::str::FromStr;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Markdown,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" | "terminal" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            _ => Err(anyhow!(
                "Unknown format '{}'. Valid formats: text, json, markdown",
                s
            )),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
        }
    }
}

/// One metric row of the audit trail
#[derive(Debug, Clone, Serialize)]
pub struct MetricLine {
    pub key: String,
    /// Observed value, with `T`/`F` spelled out for boolean metrics.
    pub value: Option<String>,
    /// Resolved standalone contribution, when one applied.
    pub modifier: Option<f64>,
    /// Whether a matching combo claimed this metric.
    pub in_combo: bool,
}

/// One combo row of the audit trail
#[derive(Debug, Clone, Serialize)]
pub struct ComboLine {
    pub name: String,
    pub status: ComboStatus,
    /// What this combo would contribute.
    pub modifier: f64,
}

/// Everything a reporter needs to render one evaluation.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreReport {
    pub extension: String,
    pub version: String,
    pub tlp: String,
    pub base_score: Option<f64>,
    pub vector: ExtensionVector,
    pub score: Option<f64>,
    pub severity: Option<Severity>,
    pub metrics: Vec<MetricLine>,
    pub combos: Vec<ComboLine>,
    pub winning_combo: Option<String>,
}

impl ScoreReport {
    /// Join an evaluation result with its rule set and selection context.
    pub fn build(
        extension: &str,
        version: &str,
        tlp: &str,
        base_score: Option<f64>,
        vector: &ExtensionVector,
        rules: &RuleSet,
        result: &EvaluationResult,
    ) -> ScoreReport {
        let claimed = result.claimed_metrics();

        let metrics = rules
            .metrics
            .keys()
            .map(|key| MetricLine {
                key: key.clone(),
                value: vector.get(key).map(display_value),
                modifier: result.metric_modifiers.get(key).copied(),
                in_combo: claimed.contains(key.as_str()),
            })
            .collect();

        let combos = result
            .all_combos
            .iter()
            .map(|combo| ComboLine {
                name: combo.name.clone(),
                status: result.combo_status(&combo.name),
                modifier: result
                    .combo_modifiers
                    .get(&combo.name)
                    .copied()
                    .unwrap_or(0.0),
            })
            .collect();

        ScoreReport {
            extension: extension.to_string(),
            version: version.to_string(),
            tlp: tlp.to_string(),
            base_score,
            vector: vector.clone(),
            score: result.score,
            severity: result.severity,
            metrics,
            combos,
            winning_combo: result.winning_combo.as_ref().map(|w| w.name.clone()),
        }
    }
}

fn display_value(value: &str) -> String {
    match value {
        BOOL_TRUE => "True".to_string(),
        BOOL_FALSE => "False".to_string(),
        other => other.to_string(),
    }
}

/// Render a score report in the specified format
pub fn render(report: &ScoreReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => text::render(report),
        OutputFormat::Json => json::render(report),
        OutputFormat::Markdown => markdown::render(report),
    }
}
