//! Extension Scoring Engine
//!
//! Augments an externally computed CVSS-style base score with an
//! extension's declarative rules: per-metric modifiers and multi-metric
//! combo rules.
//!
//! # Scoring Formula
//!
//! ```text
//! final = base
//!       + Σ metric modifiers for metrics NOT claimed by a matching combo
//!       + winning combo modifier (if any combo matched)
//!
//! Modifier value:  ADD -> operand,  MUL -> base × operand
//! final is clamped to [0, 10] and rounded to one decimal.
//! ```
//!
//! # Combo Selection
//!
//! A combo matches when every one of its metric-value conditions holds.
//! Exactly one matching combo becomes the winner: a lone match wins
//! unconditionally; among several, the strictly largest resolved modifier
//! wins and ties go to the earliest-declared combo. Metrics referenced by
//! *any* matching combo (winner or not) are excluded from standalone
//! summation so their effect is never double-counted.
//!
//! # Severity Bands
//!
//! 0.0 None | 0.1–3.9 Low | 4.0–6.9 Medium | 7.0–8.9 High | 9.0–10.0 Critical

mod extension_scorer;

pub use extension_scorer::{
    combo_matches, matching_combos, resolve_modifier, ComboStatus, EvaluationResult,
    ExtensionScorer, WinningCombo,
};
