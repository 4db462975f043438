//! Core data models for cvssx
//!
//! These types form the declarative rule set an extension publishes:
//! per-metric modifiers, multi-metric combo rules, and the severity
//! bands derived from the final adjusted score.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Symbolic value an observed boolean metric uses for "true".
pub const BOOL_TRUE: &str = "T";

/// Symbolic value an observed boolean metric uses for "false".
pub const BOOL_FALSE: &str = "F";

/// Severity bands for a final extension-adjusted score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    None,
    Low,
    Medium,
    High,
    Critical,
    Unknown,
}

impl Severity {
    /// Classify a final score that has already been clamped to [0, 10]
    /// and rounded to one decimal place.
    pub fn from_score(score: f64) -> Severity {
        if score == 0.0 {
            Severity::None
        } else if score > 0.0 && score < 4.0 {
            Severity::Low
        } else if score < 7.0 {
            Severity::Medium
        } else if score < 9.0 {
            Severity::High
        } else if score <= 10.0 {
            Severity::Critical
        } else {
            // Unreachable after clamping; kept so classification is total.
            Severity::Unknown
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::None => write!(f, "None"),
            Severity::Low => write!(f, "Low"),
            Severity::Medium => write!(f, "Medium"),
            Severity::High => write!(f, "High"),
            Severity::Critical => write!(f, "Critical"),
            Severity::Unknown => write!(f, "Unknown"),
        }
    }
}

/// How a modifier's operand combines with the base score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Operation {
    /// Contributes the operand directly.
    Add,
    /// Contributes `base_score * operand`.
    Mul,
    /// Any tag the decoder did not recognize. Contributes zero, so a rule
    /// document with a typo'd operation degrades instead of aborting.
    Unknown,
}

impl<'de> Deserialize<'de> for Operation {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let tag = String::deserialize(deserializer)?;
        Ok(Operation::from_tag(&tag))
    }
}

impl Operation {
    /// Parse an operation tag, falling back to `Unknown` for anything
    /// that is not `ADD` or `MUL`.
    pub fn from_tag(tag: &str) -> Operation {
        match tag {
            "ADD" => Operation::Add,
            "MUL" => Operation::Mul,
            _ => Operation::Unknown,
        }
    }
}

/// One score adjustment: an operation and its operand
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Modifier {
    #[serde(alias = "math")]
    pub operation: Operation,
    #[serde(alias = "val")]
    pub operand: f64,
}

impl Modifier {
    pub fn add(operand: f64) -> Modifier {
        Modifier {
            operation: Operation::Add,
            operand,
        }
    }

    pub fn mul(operand: f64) -> Modifier {
        Modifier {
            operation: Operation::Mul,
            operand,
        }
    }
}

/// How one metric contributes to the score independently of combos
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricRule {
    /// Observed values are `T` / `F`; either side may carry a modifier.
    /// An absent side means "no contribution", distinct from an explicit
    /// `ADD 0`.
    Boolean {
        if_true: Option<Modifier>,
        if_false: Option<Modifier>,
    },
    /// Observed values come from an explicit ordered set. Only values
    /// present in `values` carry a modifier; others contribute nothing.
    Enumerated {
        allowed: Vec<String>,
        values: BTreeMap<String, Modifier>,
    },
}

impl MetricRule {
    /// Default observed value when a vector omits this metric entirely:
    /// `F` for boolean metrics, the first allowed value for enumerated.
    pub fn default_value(&self) -> Option<&str> {
        match self {
            MetricRule::Boolean { .. } => Some(BOOL_FALSE),
            MetricRule::Enumerated { allowed, .. } => allowed.first().map(String::as_str),
        }
    }
}

/// The value(s) a combo condition accepts for its metric
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Accepted {
    Value(String),
    AnyOf(Vec<String>),
}

impl Accepted {
    pub fn contains(&self, observed: &str) -> bool {
        match self {
            Accepted::Value(v) => v == observed,
            Accepted::AnyOf(vs) => vs.iter().any(|v| v == observed),
        }
    }
}

/// One conjunct of a combo rule: satisfied when the vector defines
/// `metric` and its value is one of `accepted`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Condition {
    pub metric: String,
    #[serde(alias = "value")]
    pub accepted: Accepted,
}

/// A multi-metric rule: fires when every condition holds, contributing
/// a single modifier in place of the claimed metrics' own modifiers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComboRule {
    pub name: String,
    pub conditions: Vec<Condition>,
    pub modifier: Modifier,
}

/// An extension's declarative configuration, immutable once loaded.
///
/// Combo order is declaration order; it matters only as the tie-break
/// input when several combos match with equal modifier values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleSet {
    #[serde(default)]
    pub metrics: BTreeMap<String, MetricRule>,
    #[serde(default)]
    pub combos: Vec<ComboRule>,
}

impl RuleSet {
    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty() && self.combos.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_band_boundaries() {
        assert_eq!(Severity::from_score(0.0), Severity::None);
        assert_eq!(Severity::from_score(0.1), Severity::Low);
        assert_eq!(Severity::from_score(3.9), Severity::Low);
        assert_eq!(Severity::from_score(4.0), Severity::Medium);
        assert_eq!(Severity::from_score(6.9), Severity::Medium);
        assert_eq!(Severity::from_score(7.0), Severity::High);
        assert_eq!(Severity::from_score(8.9), Severity::High);
        assert_eq!(Severity::from_score(9.0), Severity::Critical);
        assert_eq!(Severity::from_score(10.0), Severity::Critical);
    }

    #[test]
    fn unknown_operation_tag_decodes_to_unknown() {
        let m: Modifier = serde_yaml::from_str("math: XOR\nval: 2.5").unwrap();
        assert_eq!(m.operation, Operation::Unknown);
        assert_eq!(m.operand, 2.5);

        let m: Modifier = serde_yaml::from_str("math: MUL\nval: 0.9").unwrap();
        assert_eq!(m.operation, Operation::Mul);
    }

    #[test]
    fn accepted_single_and_set() {
        let one = Accepted::Value("C".into());
        assert!(one.contains("C"));
        assert!(!one.contains("R"));

        let many = Accepted::AnyOf(vec!["C".into(), "R".into()]);
        assert!(many.contains("R"));
        assert!(!many.contains("U"));
    }

    #[test]
    fn metric_rule_default_values() {
        let boolean = MetricRule::Boolean {
            if_true: Some(Modifier::add(1.0)),
            if_false: None,
        };
        assert_eq!(boolean.default_value(), Some("F"));

        let enumerated = MetricRule::Enumerated {
            allowed: vec!["C".into(), "R".into()],
            values: BTreeMap::new(),
        };
        assert_eq!(enumerated.default_value(), Some("C"));
    }
}
