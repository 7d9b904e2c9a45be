// Report rendering for audit results

use crate::audit::AuditReport;
use crate::error::Result;
use crate::finding::{Finding, FindingKind};
use crate::graph::Depth;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;

const HEAVY_RULE: &str =
    "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";
const LIGHT_RULE: &str =
    "────────────────────────────────────────────────────────────────────────────────";
// Linking pages are listed only for lightly linked domains
const MAX_LISTED_SOURCES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportFormat {
    Text,
    Json,
    Markdown,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            "markdown" | "md" => Some(ReportFormat::Markdown),
            _ => None,
        }
    }
}

/// Render `report` in the requested format.
pub fn render_report(report: &AuditReport, format: ReportFormat) -> Result<String> {
    Ok(match format {
        ReportFormat::Text => generate_text_report(report),
        ReportFormat::Json => generate_json_report(report)?,
        ReportFormat::Markdown => generate_markdown_report(report),
    })
}

/// Findings of one kind with identical messages collapsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindingGroup {
    pub kind: FindingKind,
    /// `(message, repeat count)` in first-seen order
    pub entries: Vec<(String, usize)>,
}

impl FindingGroup {
    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, count)| count).sum()
    }
}

/// Group findings by kind in discovery order.
pub fn group_findings(findings: &[Finding]) -> Vec<FindingGroup> {
    let mut groups: Vec<FindingGroup> = Vec::new();
    for finding in findings {
        let kind = finding.kind();
        let idx = match groups.iter().position(|g| g.kind == kind) {
            Some(idx) => idx,
            None => {
                groups.push(FindingGroup {
                    kind,
                    entries: Vec::new(),
                });
                groups.len() - 1
            }
        };

        let message = finding.message();
        let entries = &mut groups[idx].entries;
        match entries.iter_mut().find(|(m, _)| *m == message) {
            Some((_, count)) => *count += 1,
            None => entries.push((message, 1)),
        }
    }
    groups
}

fn with_count(message: &str, count: usize) -> String {
    if count > 1 {
        format!("{} (x{})", message, count)
    } else {
        message.to_string()
    }
}

fn section(report: &mut String, title: &str) {
    report.push_str(HEAVY_RULE);
    report.push('\n');
    report.push_str(title);
    report.push('\n');
    report.push_str(HEAVY_RULE);
    report.push_str("\n\n");
}

fn deep_pages(data: &AuditReport) -> Vec<(&str, usize)> {
    data.findings
        .iter()
        .filter_map(|finding| match finding {
            Finding::DeepPage { url, depth } => Some((url.as_str(), *depth)),
            _ => None,
        })
        .collect()
}

pub fn generate_text_report(data: &AuditReport) -> String {
    let mut report = String::new();

    report.push_str(HEAVY_RULE);
    report.push('\n');
    report.push_str("                          SITEAUDIT LINK & SEO REPORT\n");
    report.push_str(HEAVY_RULE);
    report.push_str("\n\n");

    report.push_str(&format!("Pages:        {}\n", data.page_count));
    report.push_str(&format!("Links:        {}\n", data.link_count));
    report.push_str(&format!("Graph Edges:  {}\n", data.graph.edge_count()));
    report.push_str(&format!(
        "Sitemap:      {}\n",
        if data.sitemap_checked { "checked" } else { "not found" }
    ));
    report.push('\n');

    section(&mut report, "SCORE");
    report.push_str(&format!(
        "Score: {}/100   Grade: {}\n\n",
        data.score.score, data.score.grade
    ));
    if data.score.deductions.is_empty() {
        report.push_str("  No deductions.\n");
    }
    for deduction in &data.score.deductions {
        report.push_str(&format!("  -{:<4} {}\n", deduction.points, deduction.reason));
    }
    report.push('\n');

    let groups = group_findings(&data.findings);
    if !groups.is_empty() {
        section(&mut report, "FINDINGS");

        for group in &groups {
            report.push_str(&format!(
                "[{}] {} ({})\n",
                group.kind.severity().as_str().to_uppercase(),
                group.kind.title(),
                group.total()
            ));
            for (message, count) in &group.entries {
                report.push_str(&wrap_text(&with_count(message, *count), 80, "  "));
            }
            report.push('\n');
            report.push_str(LIGHT_RULE);
            report.push_str("\n\n");
        }
    }

    section(&mut report, "STRUCTURE");
    report.push_str(&format!("Orphan pages: {}\n", data.orphans.len()));
    for url in &data.orphans {
        report.push_str(&format!("  {}\n", url));
    }
    let deep = deep_pages(data);
    report.push_str(&format!("Deep pages: {}\n", deep.len()));
    for (url, depth) in deep {
        report.push_str(&format!("  {} (depth: {})\n", url, depth));
    }
    let unreachable: Vec<&str> = data.depths.unreachable();
    report.push_str(&format!("Unreachable pages: {}\n", unreachable.len()));
    for url in unreachable {
        report.push_str(&format!("  {}\n", url));
    }
    report.push('\n');

    section(&mut report, "OUTBOUND LINKS");
    if data.outbound.is_empty() {
        report.push_str("  No external links.\n");
    }
    for domain in &data.outbound {
        report.push_str(&format!(
            "  {}: {} links from {} pages\n",
            domain.domain,
            domain.links,
            domain.sources.len()
        ));
        if domain.sources.len() <= MAX_LISTED_SOURCES {
            let sources: Vec<&str> = domain.sources.iter().map(String::as_str).collect();
            report.push_str(&format!("    (from: {})\n", sources.join(", ")));
        }
    }
    report.push('\n');

    section(
        &mut report,
        &format!("PAGE CONNECTIVITY ({} pages)", data.graph.page_count()),
    );
    for (url, count) in data.graph.in_link_counts() {
        report.push_str(&format!("  {}: {} incoming links\n", url, count));
    }
    report.push('\n');

    report.push_str(HEAVY_RULE);
    report.push('\n');
    report.push_str("                                 End of Report\n");
    report.push_str(HEAVY_RULE);
    report.push('\n');

    report
}

pub fn generate_markdown_report(data: &AuditReport) -> String {
    let mut report = String::new();

    report.push_str("# Site Audit Report\n\n");
    report.push_str(&format!(
        "**Score:** {}/100 (grade {})\n\n",
        data.score.score, data.score.grade
    ));
    report.push_str("| Metric | Value |\n|---|---|\n");
    report.push_str(&format!("| Pages | {} |\n", data.page_count));
    report.push_str(&format!("| Links | {} |\n", data.link_count));
    report.push_str(&format!("| Graph edges | {} |\n", data.graph.edge_count()));
    report.push_str(&format!("| Findings | {} |\n\n", data.findings.len()));

    if !data.score.deductions.is_empty() {
        report.push_str("## Deductions\n\n");
        for deduction in &data.score.deductions {
            report.push_str(&format!("- **-{}** {}\n", deduction.points, deduction.reason));
        }
        report.push('\n');
    }

    let groups = group_findings(&data.findings);
    if !groups.is_empty() {
        report.push_str("## Findings\n\n");
        for group in &groups {
            report.push_str(&format!(
                "### {} ({}, {})\n\n",
                group.kind.title(),
                group.kind.severity().as_str(),
                group.total()
            ));
            for (message, count) in &group.entries {
                report.push_str(&format!("- {}\n", escape_markdown(&with_count(message, *count))));
            }
            report.push('\n');
        }
    }

    if !data.outbound.is_empty() {
        report.push_str("## Outbound Domains\n\n");
        report.push_str("| Domain | Links | Pages |\n|---|---|---|\n");
        for domain in &data.outbound {
            report.push_str(&format!(
                "| {} | {} | {} |\n",
                escape_markdown(&domain.domain),
                domain.links,
                domain.sources.len()
            ));
        }
        report.push('\n');
    }

    report.push_str("## Page Connectivity\n\n");
    report.push_str("| Page | In-links |\n|---|---|\n");
    for (url, count) in data.graph.in_link_counts() {
        report.push_str(&format!("| `{}` | {} |\n", url, count));
    }
    report.push('\n');

    report.push_str("## Click Depth\n\n");
    report.push_str("| Page | Depth |\n|---|---|\n");
    for (url, depth) in data.depths.iter() {
        let depth = match depth {
            Depth::Reachable(d) => d.to_string(),
            Depth::Unreachable => "unreachable".to_string(),
        };
        report.push_str(&format!("| `{}` | {} |\n", url, depth));
    }

    report
}

pub fn generate_json_report(data: &AuditReport) -> serde_json::Result<String> {
    let json_report = serde_json::json!({
        "report": {
            "metadata": {
                "generator": "siteaudit",
                "version": env!("CARGO_PKG_VERSION"),
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "format": "json"
            },
            "summary": {
                "total_pages": data.page_count,
                "total_links": data.link_count,
                "total_findings": data.findings.len(),
                "score": data.score.score,
                "grade": data.score.grade
            },
            "audit": data
        }
    });

    serde_json::to_string_pretty(&json_report)
}

pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

fn escape_markdown(text: &str) -> String {
    text.replace('|', "\\|").replace('<', "&lt;").replace('>', "&gt;")
}

fn wrap_text(text: &str, width: usize, indent: &str) -> String {
    let mut result = String::new();
    let mut current_line = String::new();

    for word in text.split_whitespace() {
        if current_line.chars().count() + word.chars().count() + 1 > width - indent.len()
            && !current_line.is_empty()
        {
            result.push_str(indent);
            result.push_str(&current_line);
            result.push('\n');
            current_line.clear();
        }

        if !current_line.is_empty() {
            current_line.push(' ');
        }
        current_line.push_str(word);
    }

    if !current_line.is_empty() {
        result.push_str(indent);
        result.push_str(&current_line);
        result.push('\n');
    }

    result
}
