//! Extension vector parsing
//!
//! A vector is the `CVSS:4.0/AV:N/.../EXF:T` style string carried in URLs
//! and advisories: a base-vector prefix followed by `KEY:VALUE` segments.
//! The scoring engine only needs the metric-to-value mapping; the prefix is
//! kept so a vector can round-trip through display.

use crate::models::RuleSet;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Observed metric values, as supplied by the vector source.
///
/// May contain metrics no rule set recognizes (the engine ignores them)
/// and may omit metrics a rule set declares (no contribution).
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtensionVector {
    /// The `CVSS:<version>` segment, when the vector carried one.
    pub prefix: Option<String>,
    metrics: BTreeMap<String, String>,
}

impl ExtensionVector {
    pub fn new() -> ExtensionVector {
        ExtensionVector::default()
    }

    /// Parse a vector string. Never fails: segments without a `:` or with
    /// an empty key are skipped, later duplicates overwrite earlier ones.
    pub fn parse(raw: &str) -> ExtensionVector {
        let mut vector = ExtensionVector::new();
        for segment in raw.trim().trim_matches('/').split('/') {
            let Some((key, value)) = segment.split_once(':') else {
                if !segment.is_empty() {
                    debug!("skipping vector segment without ':': {segment:?}");
                }
                continue;
            };
            if key.is_empty() {
                continue;
            }
            if key == "CVSS" {
                vector.prefix = Some(segment.to_string());
            } else {
                vector.metrics.insert(key.to_string(), value.to_string());
            }
        }
        vector
    }

    /// Observed value for a metric, if the vector defines one.
    pub fn get(&self, metric: &str) -> Option<&str> {
        self.metrics.get(metric).map(String::as_str)
    }

    pub fn insert(&mut self, metric: impl Into<String>, value: impl Into<String>) {
        self.metrics.insert(metric.into(), value.into());
    }

    pub fn contains(&self, metric: &str) -> bool {
        self.metrics.contains_key(metric)
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.metrics.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Fill in defaults for metrics the rule set declares but the vector
    /// omits: `F` for boolean metrics, the first allowed value for
    /// enumerated ones. Metrics already present are left untouched.
    pub fn fill_defaults(&mut self, rules: &RuleSet) {
        for (metric, rule) in &rules.metrics {
            if self.metrics.contains_key(metric) {
                continue;
            }
            if let Some(default) = rule.default_value() {
                debug!("defaulting {metric} to {default}");
                self.metrics.insert(metric.clone(), default.to_string());
            }
        }
    }
}

impl std::fmt::Display for ExtensionVector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut parts = Vec::with_capacity(self.metrics.len() + 1);
        if let Some(prefix) = &self.prefix {
            parts.push(prefix.clone());
        }
        for (key, value) in &self.metrics {
            parts.push(format!("{key}:{value}"));
        }
        write!(f, "{}", parts.join("/"))
    }
}

impl FromIterator<(String, String)> for ExtensionVector {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        ExtensionVector {
            prefix: None,
            metrics: iter.into_iter().collect(),
        }
    }
}
