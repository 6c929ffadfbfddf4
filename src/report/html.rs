//! HTML summary rendering
//!
//! Builds the final report document from the filtered per-page findings.
//! The document is self-contained: inline styles, no scripts, suitable for
//! attaching to a ticket or serving as a static file.

use chrono::{DateTime, Utc};

use crate::analyzer::{Impact, Violation};

/// Everything the report needs, assembled by the report stage
#[derive(Debug, Clone)]
pub struct ReportSummary {
    pub seed: String,
    pub generated_at: DateTime<Utc>,
    pub pages: Vec<PageReport>,
}

/// One audited page in the report
#[derive(Debug, Clone)]
pub struct PageReport {
    pub url: String,
    /// False when capture/analysis failed for this page; it is still listed
    /// so readers know it was attempted
    pub ok: bool,
    pub violations: Vec<Violation>,
}

impl ReportSummary {
    /// Total violations of a given impact across all pages
    pub fn count_by_impact(&self, impact: Impact) -> usize {
        self.pages
            .iter()
            .flat_map(|p| &p.violations)
            .filter(|v| v.impact == impact)
            .count()
    }

    pub fn total_violations(&self) -> usize {
        self.pages.iter().map(|p| p.violations.len()).sum()
    }
}

/// Renders the summary as a complete HTML document
pub fn render_report(summary: &ReportSummary) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<title>Accessibility Audit Report</title>\n");
    html.push_str("<style>\n");
    html.push_str("body { font-family: sans-serif; margin: 2rem; color: #222; }\n");
    html.push_str("table { border-collapse: collapse; }\n");
    html.push_str("td, th { border: 1px solid #ccc; padding: 0.4rem 0.8rem; text-align: left; }\n");
    html.push_str(".impact-critical { color: #b00020; font-weight: bold; }\n");
    html.push_str(".impact-serious { color: #c75000; font-weight: bold; }\n");
    html.push_str(".impact-moderate { color: #8a6d00; }\n");
    html.push_str(".impact-minor { color: #555; }\n");
    html.push_str(".failed-page { color: #b00020; }\n");
    html.push_str("code { background: #f4f4f4; padding: 0 0.2rem; }\n");
    html.push_str("</style>\n</head>\n<body>\n");

    html.push_str("<h1>Accessibility Audit Report</h1>\n");
    html.push_str(&format!(
        "<p>Site: <code>{}</code><br>Generated: {}</p>\n",
        escape(&summary.seed),
        summary.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    render_totals(&mut html, summary);

    for page in &summary.pages {
        render_page(&mut html, page);
    }

    html.push_str("</body>\n</html>\n");
    html
}

fn render_totals(html: &mut String, summary: &ReportSummary) {
    html.push_str("<h2>Summary</h2>\n<table>\n");
    html.push_str("<tr><th>Impact</th><th>Count</th></tr>\n");
    for impact in Impact::all_desc() {
        html.push_str(&format!(
            "<tr><td class=\"impact-{impact}\">{}</td><td>{}</td></tr>\n",
            capitalize(impact.as_str()),
            summary.count_by_impact(impact)
        ));
    }
    html.push_str(&format!(
        "<tr><th>Total</th><th>{}</th></tr>\n</table>\n",
        summary.total_violations()
    ));
    html.push_str(&format!(
        "<p>{} page(s) audited.</p>\n",
        summary.pages.len()
    ));
}

fn render_page(html: &mut String, page: &PageReport) {
    html.push_str(&format!("<h2><code>{}</code></h2>\n", escape(&page.url)));

    if !page.ok {
        html.push_str(
            "<p class=\"failed-page\">This page could not be loaded; no checks were run.</p>\n",
        );
        return;
    }

    if page.violations.is_empty() {
        html.push_str("<p>No violations found.</p>\n");
        return;
    }

    for violation in &page.violations {
        render_violation(html, violation);
    }
}

fn render_violation(html: &mut String, violation: &Violation) {
    html.push_str(&format!(
        "<h3><span class=\"impact-{}\">[{}]</span> {}</h3>\n",
        violation.impact,
        capitalize(violation.impact.as_str()),
        escape(&violation.id)
    ));
    html.push_str(&format!("<p>{}</p>\n", escape(&violation.description)));

    if !violation.tags.is_empty() {
        html.push_str(&format!(
            "<p>Tags: <code>{}</code></p>\n",
            escape(&violation.tags.join(", "))
        ));
    }

    if !violation.nodes.is_empty() {
        html.push_str("<ul>\n");
        for node in &violation.nodes {
            html.push_str(&format!(
                "<li><code>{}</code> &mdash; <code>{}</code></li>\n",
                escape(&node.selector),
                escape(&node.snippet)
            ));
        }
        html.push_str("</ul>\n");
    }
}

/// Minimal HTML escaping for text interpolated into the report
fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
