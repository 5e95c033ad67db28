//! Report normalizer: the synthesizer's free text → [`VerificationReport`].
//!
//! A single pass over lines with a small section state machine. Each trimmed
//! line is classified in a fixed order:
//!
//! 1. blank → skipped
//! 2. literal `CONFIDENCE:` prefix → confidence
//! 3. upper-cased text containing `KEY FINDINGS` / `UNVERIFIED` / `SUMMARY` → section header
//! 4. bullet (`•`, `-`, `*`) → item for the current list section
//! 5. anything else → summary text, if inside the summary section
//!
//! Headers are tested before bullets, so a bullet whose text mentions a
//! section name switches section and is itself discarded.

use counterpoint_common::{VerificationReport, NOT_AVAILABLE};

const CONFIDENCE_MARKER: &str = "CONFIDENCE:";
const BULLET_GLYPHS: [char; 3] = ['•', '-', '*'];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Section {
    #[default]
    None,
    Findings,
    Unverified,
    Summary,
}

/// One classified input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line<'a> {
    Blank,
    /// Remainder after the marker, trimmed, `%` removed.
    Confidence(String),
    /// Bullet text with glyphs stripped. May be empty (e.g. `---`).
    Bullet(&'a str),
    Header(Section),
    Text(&'a str),
}

/// What a line contributes to the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action<'a> {
    Skip,
    SetConfidence(String),
    Finding(&'a str),
    Unverified(&'a str),
    SummaryText(&'a str),
}

pub fn classify(raw: &str) -> Line<'_> {
    let line = raw.trim();
    if line.is_empty() {
        return Line::Blank;
    }

    if let Some(rest) = line.strip_prefix(CONFIDENCE_MARKER) {
        return Line::Confidence(rest.trim().replace('%', ""));
    }

    let upper = line.to_uppercase();
    if upper.contains("KEY FINDINGS") {
        return Line::Header(Section::Findings);
    }
    if upper.contains("UNVERIFIED") {
        return Line::Header(Section::Unverified);
    }
    if upper.contains("SUMMARY") {
        return Line::Header(Section::Summary);
    }

    if line.starts_with(BULLET_GLYPHS) {
        let text = line
            .trim_start_matches(|c: char| BULLET_GLYPHS.contains(&c) || c == ' ')
            .trim();
        return Line::Bullet(text);
    }

    Line::Text(line)
}

/// Pure state transition: current section + line → next section + effect.
pub fn transition<'a>(state: Section, line: Line<'a>) -> (Section, Action<'a>) {
    match line {
        Line::Blank => (state, Action::Skip),
        Line::Confidence(value) => (state, Action::SetConfidence(value)),
        Line::Header(next) => (next, Action::Skip),
        Line::Bullet("") => (state, Action::Skip),
        Line::Bullet(text) => match state {
            Section::Findings => (state, Action::Finding(text)),
            Section::Unverified => (state, Action::Unverified(text)),
            Section::Summary | Section::None => (state, Action::Skip),
        },
        Line::Text(text) => match state {
            Section::Summary => (state, Action::SummaryText(text)),
            _ => (state, Action::Skip),
        },
    }
}

pub fn normalize(raw_text: &str) -> VerificationReport {
    let mut report = VerificationReport {
        confidence: NOT_AVAILABLE.to_string(),
        ..Default::default()
    };
    let mut summary = String::new();
    let mut state = Section::None;

    for raw in raw_text.lines() {
        let (next, action) = transition(state, classify(raw));
        state = next;

        match action {
            Action::Skip => {}
            Action::SetConfidence(value) => report.confidence = value,
            Action::Finding(text) => report.key_findings.push(text.to_string()),
            Action::Unverified(text) => report.unverified_claims.push(text.to_string()),
            Action::SummaryText(text) => {
                summary.push_str(text);
                summary.push(' ');
            }
        }
    }

    report.summary = summary.trim().to_string();
    report
}
