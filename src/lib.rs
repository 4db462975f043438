//! cvssx - CVSS extension scoring
//!
//! Augments a standardized CVSS-style base score with organization-defined
//! extension rules: per-metric modifiers and multi-metric combo rules,
//! evaluated deterministically into a final clamped score, a severity
//! band, and a full audit trail.

pub mod cli;
pub mod config;
pub mod models;
pub mod reporters;
pub mod scoring;
pub mod vector;
