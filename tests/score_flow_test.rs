//! Integration tests for the full scoring flow
//!
//! These tests drive the library the way the CLI does: write a rules
//! file, load the catalog, parse a vector, evaluate, and render. Each
//! test uses its own temp directory.

use cvssx::config::{validate_catalog, ExtensionCatalog};
use cvssx::models::Severity;
use cvssx::reporters::{render, OutputFormat, ScoreReport};
use cvssx::scoring::{ComboStatus, ExtensionScorer};
use cvssx::vector::ExtensionVector;
use std::path::PathBuf;
use tempfile::TempDir;

const RULES_YAML: &str = r#"
TLP: CLEAR
default_ext: [KSEC, "1.0"]
extensions:
  KSEC:
    TLP: AMBER
    "1.0":
      metrics:
        EXF:
          name: Exfiltration
          type: BOOL
          if_true: { math: ADD, val: 1.0 }
        PRV:
          name: Privilege reach
          type: BOOL
          if_true: { math: ADD, val: 0.5 }
        RC:
          name: Report confidence
          type: [C, R, U]
          values:
            C: { math: ADD, val: 0.5 }
            U: { math: MUL, val: -0.1 }
      combos:
        - name: confirmed-exfiltration
          conditions:
            - metric: EXF
              value: T
            - metric: RC
              value: [C, R]
          modifier: { math: ADD, val: 2.0 }
        - name: exfiltration-anyway
          conditions:
            - metric: EXF
              value: T
          modifier: { math: ADD, val: 1.5 }
"#;

fn write_rules(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("extension.yaml");
    std::fs::write(&path, RULES_YAML).expect("Failed to write rules fixture");
    path
}

#[test]
fn end_to_end_score_with_combo_claiming() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_rules(&dir);

    let catalog = ExtensionCatalog::load(&path).unwrap();
    let mut vector = ExtensionVector::parse("CVSS:4.0/AV:N/KSEC:1.0/EXF:T/RC:C/PRV:T");
    let (extension, version) = catalog.detect_from_vector(&vector).unwrap();
    assert_eq!((extension, version), ("KSEC", "1.0"));

    let rules = catalog.rule_set("KSEC", "1.0").unwrap();
    vector.fill_defaults(rules);

    let result = ExtensionScorer::new(Some(rules)).evaluate(Some(5.0), &vector);

    // Both combos match; the larger modifier wins and its conditions claim
    // EXF and RC, so only PRV sums independently:
    // 5.0 + 0.5 (PRV) + 2.0 (confirmed-exfiltration) = 7.5
    assert_eq!(result.score, Some(7.5));
    assert_eq!(result.severity, Some(Severity::High));
    assert_eq!(
        result.winning_combo.as_ref().unwrap().name,
        "confirmed-exfiltration"
    );
    assert_eq!(
        result.combo_status("exfiltration-anyway"),
        ComboStatus::LosingValid
    );

    // Trail still records each metric's standalone resolution.
    assert_eq!(result.metric_modifiers.get("EXF"), Some(&1.0));
    assert_eq!(result.metric_modifiers.get("RC"), Some(&0.5));
    assert_eq!(result.metric_modifiers.get("PRV"), Some(&0.5));
}

#[test]
fn defaults_fill_unset_metrics_before_scoring() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_rules(&dir);

    let catalog = ExtensionCatalog::load(&path).unwrap();
    let rules = catalog.rule_set("KSEC", "1.0").unwrap();

    // Vector sets nothing; defaults are EXF:F, PRV:F, RC:C (first allowed).
    let mut vector = ExtensionVector::parse("CVSS:4.0/AV:N");
    vector.fill_defaults(rules);
    assert_eq!(vector.get("EXF"), Some("F"));
    assert_eq!(vector.get("RC"), Some("C"));

    let result = ExtensionScorer::new(Some(rules)).evaluate(Some(5.0), &vector);
    // EXF:F has no if_false modifier; RC:C adds 0.5; no combo matches.
    assert_eq!(result.score, Some(5.5));
    assert!(result.matched_combos.is_empty());
}

#[test]
fn mul_against_default_rc_value() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_rules(&dir);

    let catalog = ExtensionCatalog::load(&path).unwrap();
    let rules = catalog.rule_set("KSEC", "1.0").unwrap();

    let mut vector = ExtensionVector::parse("CVSS:4.0/RC:U");
    vector.fill_defaults(rules);
    let result = ExtensionScorer::new(Some(rules)).evaluate(Some(8.0), &vector);
    // RC:U is MUL -0.1 against base 8.0 -> -0.8; EXF/PRV default F with no
    // false-side modifier.
    assert_eq!(result.score, Some(7.2));
    assert_eq!(result.severity, Some(Severity::High));
}

#[test]
fn report_renders_in_every_format() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_rules(&dir);

    let catalog = ExtensionCatalog::load(&path).unwrap();
    let rules = catalog.rule_set("KSEC", "1.0").unwrap();
    let mut vector = ExtensionVector::parse("CVSS:4.0/EXF:T/RC:C");
    vector.fill_defaults(rules);
    let result = ExtensionScorer::new(Some(rules)).evaluate(Some(5.0), &vector);

    let tlp = catalog.tlp(Some("KSEC"), Some("1.0"));
    assert_eq!(tlp, "AMBER");
    let report = ScoreReport::build("KSEC", "1.0", &tlp, Some(5.0), &vector, rules, &result);

    let text = render(&report, OutputFormat::Text).unwrap();
    assert!(text.contains("KSEC"));
    assert!(text.contains("confirmed-exfiltration"));

    let md = render(&report, OutputFormat::Markdown).unwrap();
    assert!(md.contains("## Combos"));

    let json = render(&report, OutputFormat::Json).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed["winning_combo"], "confirmed-exfiltration");
    assert_eq!(parsed["tlp"], "AMBER");
}

#[test]
fn absent_base_score_is_not_applicable_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_rules(&dir);

    let catalog = ExtensionCatalog::load(&path).unwrap();
    let rules = catalog.rule_set("KSEC", "1.0").unwrap();
    let vector = ExtensionVector::parse("CVSS:4.0/EXF:T");

    let result = ExtensionScorer::new(Some(rules)).evaluate(None, &vector);
    assert!(result.score.is_none());

    let report = ScoreReport::build("KSEC", "1.0", "CLEAR", None, &vector, rules, &result);
    let text = render(&report, OutputFormat::Text).unwrap();
    assert!(text.contains("not applicable"));
}

#[test]
fn clean_fixture_passes_validation() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_rules(&dir);
    let catalog = ExtensionCatalog::load(&path).unwrap();
    assert!(validate_catalog(&catalog).is_empty());
}
