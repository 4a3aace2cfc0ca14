//! Output formatting for CLI results

use crate::detection::{DetectionReport, RiskLevel, Signal};

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

fn risk_color(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::None | RiskLevel::Low => "\x1b[32m", // green
        RiskLevel::Medium => "\x1b[33m",                // yellow
        RiskLevel::High | RiskLevel::Critical => "\x1b[31m", // red
    }
}

/// Format a report for terminal output
pub fn format_report(report: &DetectionReport, show_signals: bool) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "{}{} {}{}{} {}[{}]{}\n",
        risk_color(report.risk_level),
        report.verdict.symbol(),
        BOLD,
        report.subject,
        RESET,
        DIM,
        report.domain.name(),
        RESET,
    ));

    output.push_str(&format!(
        "  {} | risk {} | score {:.2} | confidence {:.0}%\n",
        report.verdict.description(),
        report.risk_level.name(),
        report.aggregate_score,
        report.confidence
    ));
    output.push_str(&format!("  {}\n", report.summary));

    let signals: Vec<_> = if show_signals {
        report.signals.iter().collect()
    } else {
        report.notable_signals().collect()
    };
    if !signals.is_empty() {
        output.push_str("\n  Signals:\n");
        for signal in signals {
            output.push_str(&format_signal(signal, show_signals));
        }
    }

    let degraded = report.degraded_signals().count();
    if degraded > 0 && !show_signals {
        output.push_str(&format!(
            "\n  {}{} analyzer(s) were inconclusive{}\n",
            DIM, degraded, RESET
        ));
    }

    if !report.explanations.is_empty() {
        output.push_str("\n  Findings:\n");
        for explanation in &report.explanations {
            output.push_str(&format!("    • {}\n", explanation));
        }
    }

    if !report.is_clean() && !report.remediation_steps.is_empty() {
        output.push_str("\n  Recommended actions:\n");
        for (i, step) in report.remediation_steps.iter().enumerate() {
            output.push_str(&format!("    {}. {}\n", i + 1, step));
        }
    }

    output
}

fn format_signal(signal: &Signal, verbose: bool) -> String {
    let severity = signal.severity();
    let mut output = format!(
        "    {}{} {}{} {}({:.2}, {:.0}%){}\n",
        severity.color_code(),
        severity.symbol(),
        RESET,
        signal.finding,
        DIM,
        signal.score,
        signal.confidence,
        RESET
    );

    if verbose {
        output.push_str(&format!(
            "      {}{} | {}{}{}\n",
            DIM,
            signal.analyzer.name(),
            signal.category,
            if signal.degraded { " | degraded" } else { "" },
            RESET
        ));
    }

    output
}

/// Format a report as JSON
pub fn format_json(report: &DetectionReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}

/// Format a summary over several reports
pub fn format_summary(reports: &[DetectionReport], failures: usize) -> String {
    let mut output = String::new();

    let clean = reports.iter().filter(|r| r.is_clean()).count();
    let elevated = reports
        .iter()
        .filter(|r| !r.is_clean() && r.risk_level < RiskLevel::High)
        .count();
    let severe = reports.iter().filter(|r| r.risk_level >= RiskLevel::High).count();

    output.push_str(&format!("\n{}Summary:{}\n", BOLD, RESET));
    output.push_str(&format!("  {} item(s) analyzed\n", reports.len() + failures));

    if clean > 0 {
        output.push_str(&format!("  \x1b[32m✓ {} clean{}\n", clean, RESET));
    }
    if elevated > 0 {
        output.push_str(&format!("  \x1b[33m? {} suspicious{}\n", elevated, RESET));
    }
    if severe > 0 {
        output.push_str(&format!("  \x1b[31m✗ {} high risk{}\n", severe, RESET));
    }
    if failures > 0 {
        output.push_str(&format!("  \x1b[90m— {} could not be analyzed{}\n", failures, RESET));
    }

    output
}
