//! Report rendering.

use tenant_guard::audit::{AuditReport, FindingSeverity};

use crate::config::OutputFormat;

/// Renders a report in the requested format.
pub fn render(report: &AuditReport, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(report)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
    }
}

fn render_text(report: &AuditReport) -> String {
    let mut out = String::new();
    for finding in &report.findings {
        out.push_str(&finding.to_string());
        out.push('\n');
    }
    out.push_str(&format!(
        "{} error(s), {} warning(s), {} info",
        report.count(FindingSeverity::Error),
        report.count(FindingSeverity::Warning),
        report.count(FindingSeverity::Information),
    ));
    out
}
