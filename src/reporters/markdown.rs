//! Markdown reporter for GitHub-flavored Markdown output

use super::ScoreReport;
use anyhow::Result;

/// Render report as a Markdown audit trail
pub fn render(report: &ScoreReport) -> Result<String> {
    let mut lines = Vec::new();

    lines.push(format!(
        "# {} {} — Extension Score\n",
        report.extension, report.version
    ));

    let (Some(score), Some(severity)) = (report.score, report.severity) else {
        lines.push("Not applicable: no base score or no rule set.".to_string());
        return Ok(lines.join("\n"));
    };

    if let Some(base) = report.base_score {
        lines.push(format!("- **Base score**: {base:.1}"));
    }
    lines.push(format!("- **Final score**: {score:.1} / 10"));
    lines.push(format!("- **Severity**: {severity}"));
    lines.push(format!("- **TLP**: {}", report.tlp));
    lines.push(format!("- **Vector**: `{}`\n", report.vector));

    lines.push("## Scoring Formula\n".to_string());
    lines.push("```".to_string());
    lines.push("final = base + Σ unclaimed metric modifiers + winning combo modifier".to_string());
    lines.push("clamped to [0, 10], rounded to one decimal".to_string());
    lines.push("```\n".to_string());

    if !report.metrics.is_empty() {
        lines.push("## Metrics\n".to_string());
        lines.push("| Metric | Value | Modifier | Claimed by combo |".to_string());
        lines.push("|---|---|---|---|".to_string());
        for line in &report.metrics {
            lines.push(format!(
                "| {} | {} | {} | {} |",
                line.key,
                line.value.as_deref().unwrap_or("—"),
                line.modifier
                    .map(|m| format!("{m:+.2}"))
                    .unwrap_or_else(|| "—".to_string()),
                if line.in_combo { "yes" } else { "no" }
            ));
        }
        lines.push(String::new());
    }

    if !report.combos.is_empty() {
        lines.push("## Combos\n".to_string());
        lines.push("| Combo | Status | Modifier |".to_string());
        lines.push("|---|---|---|".to_string());
        for line in &report.combos {
            lines.push(format!(
                "| {} | {} | {:+.2} |",
                line.name, line.status, line.modifier
            ));
        }
        lines.push(String::new());
    }

    Ok(lines.join("\n"))
}
