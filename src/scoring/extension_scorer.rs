//! Extension scoring engine
//!
//! Takes a base score, an extension's rule set, and an observed vector and
//! produces the final clamped score, its severity band, and a full audit
//! trail of which rules fired. Pure function of its inputs: no state is
//! held across calls, so concurrent evaluation needs no coordination.

use crate::models::{ComboRule, MetricRule, Modifier, Operation, RuleSet, Severity, BOOL_TRUE};
use crate::vector::ExtensionVector;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Display status of a declared combo after evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ComboStatus {
    /// Selected as authoritative for scoring.
    Winning,
    /// Matched the vector but lost the tie-break.
    LosingValid,
    /// Did not match the vector.
    Invalid,
}

impl std::fmt::Display for ComboStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComboStatus::Winning => write!(f, "winning"),
            ComboStatus::LosingValid => write!(f, "losing_valid"),
            ComboStatus::Invalid => write!(f, "invalid"),
        }
    }
}

/// The combo selected by the tie-break, with its resolved modifier value.
#[derive(Debug, Clone, Serialize)]
pub struct WinningCombo {
    pub name: String,
    pub value: f64,
}

/// Full output of one evaluation: final score, severity, and the audit
/// trail. Owned by the caller; the engine keeps nothing.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EvaluationResult {
    /// Final clamped, rounded score. Absent when base score or rule set
    /// was absent (the "not applicable" terminal state).
    pub score: Option<f64>,
    pub severity: Option<Severity>,
    /// Resolved contribution per metric the vector defined a value for.
    /// A metric with no applicable modifier is absent, not zero.
    pub metric_modifiers: BTreeMap<String, f64>,
    /// What each declared combo *would* contribute, matched or not.
    pub combo_modifiers: BTreeMap<String, f64>,
    /// Every declared combo, in declaration order.
    pub all_combos: Vec<ComboRule>,
    /// Names of combos whose conditions all held, in declaration order.
    pub matched_combos: Vec<String>,
    pub winning_combo: Option<WinningCombo>,
}

impl EvaluationResult {
    /// The sole "not applicable" terminal state (absent base score or
    /// absent rule set): everything empty, score and severity absent.
    pub fn empty() -> EvaluationResult {
        EvaluationResult::default()
    }

    /// Display status of a declared combo.
    pub fn combo_status(&self, name: &str) -> ComboStatus {
        if self
            .winning_combo
            .as_ref()
            .is_some_and(|w| w.name == name)
        {
            ComboStatus::Winning
        } else if self.matched_combos.iter().any(|m| m == name) {
            ComboStatus::LosingValid
        } else {
            ComboStatus::Invalid
        }
    }

    /// Metrics referenced by the conditions of any matching combo. These
    /// are excluded from standalone summation; a losing combo's conditions
    /// still claim their metrics.
    pub fn claimed_metrics(&self) -> BTreeSet<&str> {
        self.all_combos
            .iter()
            .filter(|c| self.matched_combos.iter().any(|m| *m == c.name))
            .flat_map(|c| c.conditions.iter().map(|cond| cond.metric.as_str()))
            .collect()
    }
}

/// Numeric contribution of one modifier against a base score.
///
/// `ADD` contributes the operand, `MUL` contributes `base_score * operand`,
/// and an unrecognized operation contributes nothing.
pub fn resolve_modifier(modifier: &Modifier, base_score: f64) -> f64 {
    match modifier.operation {
        Operation::Add => modifier.operand,
        Operation::Mul => base_score * modifier.operand,
        Operation::Unknown => 0.0,
    }
}

/// Whether every condition of a combo is satisfied by the vector. A
/// condition on a metric the vector does not define fails the combo.
pub fn combo_matches(combo: &ComboRule, vector: &ExtensionVector) -> bool {
    combo.conditions.iter().all(|cond| {
        vector
            .get(&cond.metric)
            .is_some_and(|observed| cond.accepted.contains(observed))
    })
}

/// All combos whose conditions hold, in declaration order.
pub fn matching_combos<'r>(combos: &'r [ComboRule], vector: &ExtensionVector) -> Vec<&'r ComboRule> {
    combos
        .iter()
        .filter(|combo| combo_matches(combo, vector))
        .collect()
}

/// Evaluates an extension rule set against observed vectors.
///
/// Borrows the rule set immutably; `evaluate` may be called concurrently
/// from independent threads with distinct inputs.
pub struct ExtensionScorer<'a> {
    rules: Option<&'a RuleSet>,
}

impl<'a> ExtensionScorer<'a> {
    pub fn new(rules: Option<&'a RuleSet>) -> Self {
        Self { rules }
    }

    /// Run one full evaluation. Absent base score or absent rule set
    /// yields the empty result; nothing else can fail.
    pub fn evaluate(&self, base_score: Option<f64>, vector: &ExtensionVector) -> EvaluationResult {
        let (Some(base), Some(rules)) = (base_score, self.rules) else {
            return EvaluationResult::empty();
        };

        let metric_modifiers = self.metric_modifiers(rules, vector, base);
        let combo_modifiers: BTreeMap<String, f64> = rules
            .combos
            .iter()
            .map(|combo| (combo.name.clone(), resolve_modifier(&combo.modifier, base)))
            .collect();

        let matched = matching_combos(&rules.combos, vector);
        let winner = pick_winner(&matched, &combo_modifiers);

        // Metrics claimed by ANY matching combo are subsumed by the
        // combo's single modifier, including combos that lose the
        // tie-break.
        let claimed: BTreeSet<&str> = matched
            .iter()
            .flat_map(|combo| combo.conditions.iter().map(|cond| cond.metric.as_str()))
            .collect();

        let mut final_score = base;
        for (metric, value) in &metric_modifiers {
            if !claimed.contains(metric.as_str()) {
                final_score += value;
            }
        }
        if let Some(winner) = winner {
            final_score += combo_modifiers.get(&winner.name).copied().unwrap_or(0.0);
        }

        let clamped = final_score.clamp(0.0, 10.0);
        let rounded = (clamped * 10.0).round() / 10.0;
        let severity = Severity::from_score(rounded);

        debug!(
            "evaluated: base={base}, {} metric modifiers, {}/{} combos matched, final={rounded} ({severity})",
            metric_modifiers.len(),
            matched.len(),
            rules.combos.len(),
        );

        EvaluationResult {
            score: Some(rounded),
            severity: Some(severity),
            metric_modifiers,
            winning_combo: winner.map(|combo| WinningCombo {
                name: combo.name.clone(),
                value: combo_modifiers.get(&combo.name).copied().unwrap_or(0.0),
            }),
            combo_modifiers,
            all_combos: rules.combos.clone(),
            matched_combos: matched.iter().map(|combo| combo.name.clone()).collect(),
        }
    }

    /// Resolve the applicable per-metric modifier for every declared
    /// metric the vector has a value for. Metrics without a value, and
    /// observed values no rule entry covers, are absent from the result.
    fn metric_modifiers(
        &self,
        rules: &RuleSet,
        vector: &ExtensionVector,
        base_score: f64,
    ) -> BTreeMap<String, f64> {
        let mut modifiers = BTreeMap::new();
        for (metric, rule) in &rules.metrics {
            let Some(observed) = vector.get(metric) else {
                continue;
            };
            let selected = match rule {
                MetricRule::Boolean { if_true, if_false } => {
                    if observed == BOOL_TRUE {
                        if_true.as_ref()
                    } else {
                        if_false.as_ref()
                    }
                }
                MetricRule::Enumerated { values, .. } => values.get(observed),
            };
            if let Some(modifier) = selected {
                modifiers.insert(metric.clone(), resolve_modifier(modifier, base_score));
            }
        }
        modifiers
    }
}

/// Select the single winning combo among all that matched.
///
/// A lone match wins unconditionally. Among several, the strictly largest
/// resolved modifier wins; the scan replaces the current best only on
/// strict improvement, so equal values resolve to the earliest-declared
/// combo.
fn pick_winner<'r>(
    matched: &[&'r ComboRule],
    combo_modifiers: &BTreeMap<String, f64>,
) -> Option<&'r ComboRule> {
    match matched {
        [] => None,
        [only] => Some(only),
        _ => {
            let mut winner = matched[0];
            let mut max_value = f64::NEG_INFINITY;
            for combo in matched {
                let value = combo_modifiers.get(&combo.name).copied().unwrap_or(0.0);
                if value > max_value {
                    max_value = value;
                    winner = combo;
                }
            }
            Some(winner)
        }
    }
}
