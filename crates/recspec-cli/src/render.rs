//! Report rendering: colored text for humans, deterministic JSON for
//! machines.

use colored::Colorize;
use recspec_types::{OverallVerdict, Report, RuleStatus};
use serde::Serialize;

/// One file's report paired with its display name, for batch JSON output.
/// Serializing a `Vec<NamedReport>` (rather than a map) preserves the
/// batch's input order, which the orchestrator already guarantees.
#[derive(Debug, Serialize)]
pub struct NamedReport<'a> {
    pub name: &'a str,
    #[serde(flatten)]
    pub report: &'a Report,
}

pub fn render_json(reports: &[(String, Report)]) -> serde_json::Result<String> {
    let named: Vec<NamedReport<'_>> = reports
        .iter()
        .map(|(name, report)| NamedReport { name, report })
        .collect();
    serde_json::to_string_pretty(&named)
}

fn verdict_label(verdict: OverallVerdict) -> colored::ColoredString {
    match verdict {
        OverallVerdict::Pass => "PASS".green().bold(),
        OverallVerdict::Warning => "WARNING".yellow().bold(),
        OverallVerdict::Fail => "FAIL".red().bold(),
        OverallVerdict::Error => "ERROR".red().bold(),
    }
}

fn status_label(status: RuleStatus) -> colored::ColoredString {
    match status {
        RuleStatus::Pass => "pass".green(),
        RuleStatus::Warning => "warning".yellow(),
        RuleStatus::Fail => "fail".red(),
    }
}

/// Renders one file's report as colored, human-readable lines.
pub fn render_human(name: &str, report: &Report) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{} {} {}\n",
        name.bold(),
        "•".dimmed(),
        verdict_label(report.overall)
    ));

    if let Some(message) = &report.error {
        out.push_str(&format!("  {} {}\n", "error:".red(), message));
    }

    for (rule, result) in &report.validations {
        out.push_str(&format!(
            "  {:<14} {}  observed={}  expected={}",
            rule,
            status_label(result.status),
            result.observed,
            result.expected
        ));
        if let Some(message) = &result.message {
            out.push_str(&format!("  ({message})"));
        }
        out.push('\n');
    }

    out
}

/// Renders the aggregate summary line shown after a directory batch run.
pub fn render_summary(summary: &recspec_batch::BatchSummary) -> String {
    format!(
        "{}  {}: {}  {}: {}  {}: {}  {}: {}",
        "Summary".bold(),
        "pass".green(),
        summary.pass,
        "warning".yellow(),
        summary.warning,
        "fail".red(),
        summary.fail,
        "error".red().bold(),
        summary.error
    )
}
