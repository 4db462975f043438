//! JSON reporter

use super::ScoreReport;
use anyhow::Result;

/// Render report as pretty-printed JSON
pub fn render(report: &ScoreReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Severity;
    use crate::vector::ExtensionVector;

    #[test]
    fn output_is_valid_json_with_expected_fields() {
        let report = ScoreReport {
            extension: "KSEC".to_string(),
            version: "1.0".to_string(),
            tlp: "CLEAR".to_string(),
            base_score: Some(5.0),
            vector: ExtensionVector::parse("CVSS:4.0/EXF:T"),
            score: Some(6.0),
            severity: Some(Severity::Medium),
            metrics: vec![],
            combos: vec![],
            winning_combo: None,
        };
        let out = render(&report).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["score"], 6.0);
        assert_eq!(parsed["severity"], "medium");
        assert_eq!(parsed["extension"], "KSEC");
    }
}
