use std::fmt::Write as _;

use console::style;

use counterpoint_common::{
    Confidence, ConfidenceLevel, EvidenceItem, SocialSignal, Topic, VerificationReport,
};

pub const SUMMARY_PLACEHOLDER: &str = "Analysis complete. See findings above for details.";

/// Per-list cap for findings and unverified claims.
pub const MAX_LIST_ITEMS: usize = 5;
pub const MAX_SOURCES: usize = 6;
pub const MAX_POSTS: usize = 5;

const TITLE_CHARS: usize = 40;

// --- HTML (stored in history) ---

/// Render the report body persisted as `report_html`.
pub fn render_report_html(report: &VerificationReport) -> String {
    let mut html = String::from(r#"<div class="counterpoint-report">"#);

    html.push_str(r#"<h3 class="confirmed">✓ CONFIRMED FACTS</h3><ul class="confirmed">"#);
    push_items(
        &mut html,
        &report.key_findings,
        "No confirmed facts extracted from sources.",
    );
    html.push_str("</ul>");

    html.push_str(r#"<h3 class="unverified">⚠ UNVERIFIED CLAIMS</h3><ul class="unverified">"#);
    push_items(
        &mut html,
        &report.unverified_claims,
        "No unverified claims detected.",
    );
    html.push_str("</ul>");

    html.push_str(r#"<h3 class="summary">EXECUTIVE SUMMARY</h3>"#);
    let _ = write!(
        html,
        r#"<p class="summary">{}</p>"#,
        html_escape(summary_or_placeholder(&report.summary))
    );

    html.push_str("</div>");
    html
}

fn push_items(html: &mut String, items: &[String], empty: &str) {
    if items.is_empty() {
        let _ = write!(html, "<li>{empty}</li>");
        return;
    }
    for item in items.iter().take(MAX_LIST_ITEMS) {
        let _ = write!(html, "<li>{}</li>", html_escape(item));
    }
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Plain-text view of stored report markup, wrapped at 80 columns.
pub fn html_to_plain_text(html: &str) -> String {
    html2text::from_read(html.as_bytes(), 80).unwrap_or_default()
}

pub fn summary_or_placeholder(summary: &str) -> &str {
    let trimmed = summary.trim();
    if trimmed.is_empty() {
        SUMMARY_PLACEHOLDER
    } else {
        trimmed
    }
}

// --- Source cards ---

/// Host of `url` without a leading `www.`, or "Source" when there is none.
pub fn source_domain(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.trim_start_matches("www.").to_string()))
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| "Source".to_string())
}

/// First 40 characters plus "..." for longer titles.
pub fn truncate_title(title: &str) -> String {
    if title.chars().count() > TITLE_CHARS {
        let head: String = title.chars().take(TITLE_CHARS).collect();
        format!("{head}...")
    } else {
        title.to_string()
    }
}

// --- Terminal ---

pub fn confidence_line(confidence: &Confidence) -> String {
    let level = confidence.level();
    let label = match level {
        ConfidenceLevel::High => style(level.to_string()).green(),
        ConfidenceLevel::Medium => style(level.to_string()).yellow(),
        ConfidenceLevel::Low => style(level.to_string()).red(),
    };
    match confidence {
        Confidence::Score(n) => format!("{n}% · {label}"),
        Confidence::Unscored(text) => format!("{text} · {label}"),
    }
}

/// Full terminal view of one completed run.
pub fn render_terminal(
    topic: &Topic,
    report: &VerificationReport,
    sources: &[EvidenceItem],
    social: &SocialSignal,
) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}", style(format!("Verification: {topic}")).bold());
    let _ = writeln!(out, "Confidence: {}", confidence_line(&report.confidence_score()));
    out.push('\n');

    out.push_str(&render_report_terminal(report));
    out.push('\n');
    out.push_str(&render_sources_terminal(sources));
    out.push('\n');
    out.push_str(&render_social_terminal(social));
    out
}

pub fn render_report_terminal(report: &VerificationReport) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}", style("✓ CONFIRMED FACTS").green().bold());
    push_bullets(
        &mut out,
        &report.key_findings,
        "No confirmed facts extracted from sources.",
    );

    let _ = writeln!(out, "{}", style("⚠ UNVERIFIED CLAIMS").red().bold());
    push_bullets(&mut out, &report.unverified_claims, "No unverified claims detected.");

    let _ = writeln!(out, "{}", style("EXECUTIVE SUMMARY").bold());
    let _ = writeln!(out, "  {}", summary_or_placeholder(&report.summary));
    out
}

fn push_bullets(out: &mut String, items: &[String], empty: &str) {
    if items.is_empty() {
        let _ = writeln!(out, "  {}", style(empty).dim());
        return;
    }
    for item in items.iter().take(MAX_LIST_ITEMS) {
        let _ = writeln!(out, "  • {item}");
    }
}

pub fn render_sources_terminal(sources: &[EvidenceItem]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", style("SOURCES").cyan().bold());
    for source in sources.iter().take(MAX_SOURCES) {
        let _ = writeln!(
            out,
            "  • {}  {}",
            truncate_title(&source.title),
            style(source_domain(&source.url)).cyan()
        );
    }
    out
}

pub fn render_social_terminal(social: &SocialSignal) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", style("X.COM INTEL").blue().bold());

    let intel = match social {
        SocialSignal::Error(err) => {
            let _ = writeln!(out, "  {}", style(format!("⚠ {}", err.error)).red());
            if let Some(raw) = &err.raw {
                for line in raw.lines() {
                    let _ = writeln!(out, "    {}", style(line).dim());
                }
            }
            return out;
        }
        SocialSignal::Intel(intel) => intel,
        SocialSignal::Other(value) => {
            let _ = writeln!(out, "  {}", style("Unrecognized social signal data").yellow());
            let _ = writeln!(out, "    {}", style(value.to_string()).dim());
            return out;
        }
    };

    let summary = if intel.summary.trim().is_empty() {
        "No summary available."
    } else {
        intel.summary.trim()
    };
    let _ = writeln!(out, "  Summary: {summary}");

    if intel.viral_rumors.is_empty() {
        let _ = writeln!(out, "  {}", style("No viral rumors detected on X.").green());
    } else {
        let _ = writeln!(out, "  {}", style("Viral rumors/claims on X:").yellow());
        for rumor in &intel.viral_rumors {
            let _ = writeln!(out, "    • {rumor}");
        }
    }

    if intel.sources.is_empty() {
        let _ = writeln!(out, "  {}", style("No featured posts found.").dim());
    } else {
        let _ = writeln!(out, "  Featured posts:");
        for post in intel.sources.iter().take(MAX_POSTS) {
            let handle = non_empty_or(&post.handle, "@unknown");
            let text = non_empty_or(&post.text, "No text available");
            let _ = writeln!(out, "    {} {text}", style(handle).blue());
            if !post.link.is_empty() {
                let _ = writeln!(out, "      {}", style(&post.link).dim());
            }
        }
    }
    out
}

fn non_empty_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() {
        fallback
    } else {
        value
    }
}
