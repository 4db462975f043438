//! Rule-document lint pass
//!
//! The engine itself evaluates whatever it is given (fail-soft); this
//! pass is for rule authors, flagging shapes that evaluate in surprising
//! ways: duplicate combo names, conditions on undeclared metrics,
//! accepted values outside an enumerated metric's allowed set, and
//! non-finite operands.

use super::catalog::ExtensionCatalog;
use crate::models::{Accepted, MetricRule, Modifier, RuleSet};
use std::collections::BTreeSet;

/// One problem found in a rule document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub extension: String,
    pub version: String,
    pub message: String,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}: {}", self.extension, self.version, self.message)
    }
}

/// Check every rule set in a catalog. An empty result means no problems.
pub fn validate_catalog(catalog: &ExtensionCatalog) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    for (extension, entry) in &catalog.extensions {
        if entry.versions.is_empty() {
            issues.push(ValidationIssue {
                extension: extension.clone(),
                version: "-".to_string(),
                message: "extension declares no versions".to_string(),
            });
        }
        for (version, version_entry) in &entry.versions {
            let mut push = |message: String| {
                issues.push(ValidationIssue {
                    extension: extension.clone(),
                    version: version.clone(),
                    message,
                })
            };
            validate_rule_set(&version_entry.rules, &mut push);
        }
    }
    issues
}

fn validate_rule_set(rules: &RuleSet, push: &mut dyn FnMut(String)) {
    for (metric, rule) in &rules.metrics {
        match rule {
            MetricRule::Boolean { if_true, if_false } => {
                if let Some(m) = if_true {
                    check_operand(m, &format!("metric '{metric}' if_true"), push);
                }
                if let Some(m) = if_false {
                    check_operand(m, &format!("metric '{metric}' if_false"), push);
                }
            }
            MetricRule::Enumerated { allowed, values } => {
                if allowed.is_empty() {
                    push(format!("metric '{metric}' has an empty allowed set"));
                }
                for (value, modifier) in values {
                    if !allowed.iter().any(|a| a == value) {
                        push(format!(
                            "metric '{metric}' maps value '{value}' outside its allowed set"
                        ));
                    }
                    check_operand(modifier, &format!("metric '{metric}' value '{value}'"), push);
                }
            }
        }
    }

    let mut seen = BTreeSet::new();
    for combo in &rules.combos {
        if !seen.insert(combo.name.as_str()) {
            push(format!("duplicate combo name '{}'", combo.name));
        }
        if combo.conditions.is_empty() {
            push(format!(
                "combo '{}' has no conditions and will always match",
                combo.name
            ));
        }
        check_operand(&combo.modifier, &format!("combo '{}'", combo.name), push);
        for condition in &combo.conditions {
            match rules.metrics.get(&condition.metric) {
                None => push(format!(
                    "combo '{}' references undeclared metric '{}'",
                    combo.name, condition.metric
                )),
                Some(MetricRule::Enumerated { allowed, .. }) => {
                    let accepted: Vec<&str> = match &condition.accepted {
                        Accepted::Value(v) => vec![v.as_str()],
                        Accepted::AnyOf(vs) => vs.iter().map(String::as_str).collect(),
                    };
                    for value in accepted {
                        if !allowed.iter().any(|a| a == value) {
                            push(format!(
                                "combo '{}' accepts '{}' for metric '{}' but it is not an allowed value",
                                combo.name, value, condition.metric
                            ));
                        }
                    }
                }
                Some(MetricRule::Boolean { .. }) => {}
            }
        }
    }
}

fn check_operand(modifier: &Modifier, context: &str, push: &mut dyn FnMut(String)) {
    if !modifier.operand.is_finite() {
        push(format!("{context} has a non-finite operand"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_document_has_no_issues() {
        let catalog = ExtensionCatalog::parse(
            r#"
extensions:
  OK:
    "1.0":
      metrics:
        EXF:
          type: BOOL
          if_true: { math: ADD, val: 1.0 }
      combos:
        - name: only
          conditions:
            - metric: EXF
              value: T
          modifier: { math: ADD, val: 0.5 }
"#,
        )
        .unwrap();
        assert!(validate_catalog(&catalog).is_empty());
    }

    #[test]
    fn flags_duplicate_combo_names_and_undeclared_metrics() {
        let catalog = ExtensionCatalog::parse(
            r#"
extensions:
  BAD:
    "1.0":
      metrics:
        RC:
          type: [C, R]
          values:
            C: { math: ADD, val: 0.5 }
      combos:
        - name: twin
          conditions:
            - metric: GHOST
              value: T
          modifier: { math: ADD, val: 1.0 }
        - name: twin
          conditions:
            - metric: RC
              value: Z
          modifier: { math: ADD, val: 1.0 }
"#,
        )
        .unwrap();
        let issues = validate_catalog(&catalog);
        let messages: Vec<String> = issues.iter().map(|i| i.message.clone()).collect();
        assert!(messages.iter().any(|m| m.contains("duplicate combo name")));
        assert!(messages.iter().any(|m| m.contains("undeclared metric 'GHOST'")));
        assert!(messages.iter().any(|m| m.contains("not an allowed value")));
    }

    #[test]
    fn flags_empty_conditions() {
        let catalog = ExtensionCatalog::parse(
            r#"
extensions:
  E:
    "1.0":
      combos:
        - name: always
          conditions: []
          modifier: { math: ADD, val: 1.0 }
"#,
        )
        .unwrap();
        let issues = validate_catalog(&catalog);
        assert!(issues
            .iter()
            .any(|i| i.message.contains("will always match")));
    }
}
