//! Text (terminal) reporter with colors and formatting

use super::ScoreReport;
use crate::models::Severity;
use crate::scoring::ComboStatus;
use anyhow::Result;

/// Severity colors
fn severity_color(severity: &Severity) -> &'static str {
    match severity {
        Severity::Critical => "\x1b[31m", // Red
        Severity::High => "\x1b[91m",     // Light red
        Severity::Medium => "\x1b[33m",   // Yellow
        Severity::Low => "\x1b[34m",      // Blue
        Severity::None => "\x1b[90m",     // Gray
        Severity::Unknown => "\x1b[90m",
    }
}

/// Combo status colors
fn status_color(status: &ComboStatus) -> &'static str {
    match status {
        ComboStatus::Winning => "\x1b[32m",     // Green
        ComboStatus::LosingValid => "\x1b[33m", // Yellow
        ComboStatus::Invalid => "\x1b[90m",     // Gray
    }
}

fn status_tag(status: &ComboStatus) -> &'static str {
    match status {
        ComboStatus::Winning => "[WIN]",
        ComboStatus::LosingValid => "[---]",
        ComboStatus::Invalid => "[   ]",
    }
}

/// Reset ANSI color
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

/// Render report as formatted terminal output
pub fn render(report: &ScoreReport) -> Result<String> {
    let mut out = String::new();

    out.push_str(&format!(
        "\n{BOLD}{} {}{RESET}  {DIM}TLP:{}{RESET}\n",
        report.extension, report.version, report.tlp
    ));
    out.push_str(&format!(
        "{DIM}──────────────────────────────────────{RESET}\n"
    ));

    let (Some(score), Some(severity)) = (report.score, report.severity) else {
        out.push_str("Extension score: not applicable (no base score or no rule set)\n");
        return Ok(out);
    };

    let sev_c = severity_color(&severity);
    if let Some(base) = report.base_score {
        out.push_str(&format!("Base score: {base:.1}  "));
    }
    out.push_str(&format!(
        "Final score: {BOLD}{score:.1}/10{RESET}  Severity: {sev_c}{BOLD}{severity}{RESET}\n\n"
    ));

    // Metric contributions
    if !report.metrics.is_empty() {
        out.push_str(&format!("{BOLD}METRICS{RESET}\n"));
        out.push_str(&format!(
            "{DIM}  METRIC   VALUE      MODIFIER{RESET}\n"
        ));
        for line in &report.metrics {
            let value = line.value.as_deref().unwrap_or("-");
            let modifier = match line.modifier {
                Some(m) => format!("{m:+.2}"),
                None => "-".to_string(),
            };
            let note = if line.in_combo {
                format!("  {DIM}(claimed by combo){RESET}")
            } else {
                String::new()
            };
            out.push_str(&format!(
                "  {:<8} {:<10} {:>8}{}\n",
                line.key, value, modifier, note
            ));
        }
        out.push('\n');
    }

    // Combo outcomes
    if !report.combos.is_empty() {
        out.push_str(&format!("{BOLD}COMBOS{RESET}\n"));
        for line in &report.combos {
            let color = status_color(&line.status);
            out.push_str(&format!(
                "  {color}{}{RESET} {:<24} {:>8}  {DIM}{}{RESET}\n",
                status_tag(&line.status),
                line.name,
                format!("{:+.2}", line.modifier),
                line.status
            ));
        }
        out.push('\n');
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporters::{ComboLine, MetricLine};
    use crate::vector::ExtensionVector;

    fn sample_report() -> ScoreReport {
        ScoreReport {
            extension: "KSEC".to_string(),
            version: "1.0".to_string(),
            tlp: "AMBER".to_string(),
            base_score: Some(5.0),
            vector: ExtensionVector::parse("CVSS:4.0/EXF:T"),
            score: Some(6.0),
            severity: Some(Severity::Medium),
            metrics: vec![MetricLine {
                key: "EXF".to_string(),
                value: Some("True".to_string()),
                modifier: Some(1.0),
                in_combo: false,
            }],
            combos: vec![ComboLine {
                name: "worst-case".to_string(),
                status: ComboStatus::Invalid,
                modifier: 2.0,
            }],
            winning_combo: None,
        }
    }

    #[test]
    fn renders_score_and_sections() {
        let out = render(&sample_report()).unwrap();
        assert!(out.contains("6.0/10"));
        assert!(out.contains("Medium"));
        assert!(out.contains("EXF"));
        assert!(out.contains("worst-case"));
    }

    #[test]
    fn renders_not_applicable_without_score() {
        let mut report = sample_report();
        report.score = None;
        report.severity = None;
        let out = render(&report).unwrap();
        assert!(out.contains("not applicable"));
    }
}
