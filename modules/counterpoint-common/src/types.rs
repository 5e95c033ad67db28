use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::CounterpointError;

/// Sentinel stored when a report carries no usable confidence.
pub const NOT_AVAILABLE: &str = "N/A";

// --- Topic ---

/// A user-supplied subject. Only guarantee: non-empty after trimming.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Topic(String);

impl Topic {
    pub fn new(raw: impl AsRef<str>) -> Result<Self, CounterpointError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(CounterpointError::Validation(
                "topic must not be empty".to_string(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// --- Evidence ---

/// One retrieved web document. Lives only for the duration of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceItem {
    pub url: String,
    pub title: String,
    pub content: String,
}

// --- Social Signal ---

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialPost {
    #[serde(default, deserialize_with = "null_as_default")]
    pub handle: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub link: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
}

/// Social-media sentiment for a topic, as emitted by the chat provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialIntel {
    #[serde(
        rename = "x_summary",
        alias = "summary",
        default,
        deserialize_with = "null_as_default"
    )]
    pub summary: String,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub viral_rumors: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sources: Vec<SocialPost>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A list of strings; a lone string becomes a one-item list and non-string
/// items keep their JSON text.
fn lenient_strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => Vec::new(),
        Value::Array(items) => items.into_iter().map(value_text).collect(),
        other => vec![value_text(other)],
    })
}

fn value_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialSignalError {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

/// Either a parsed social summary or a displayable error.
///
/// Serialized untagged so history files hold either `{x_summary, ...}` or
/// `{error, raw?}`. The error shape is tried first: it is the only one with a
/// required field. Anything else found in a history file is kept verbatim as
/// `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SocialSignal {
    Error(SocialSignalError),
    Intel(SocialIntel),
    Other(Value),
}

impl SocialSignal {
    pub fn error(message: impl Into<String>) -> Self {
        SocialSignal::Error(SocialSignalError {
            error: message.into(),
            raw: None,
        })
    }

    pub fn error_with_raw(message: impl Into<String>, raw: impl Into<String>) -> Self {
        SocialSignal::Error(SocialSignalError {
            error: message.into(),
            raw: Some(raw.into()),
        })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, SocialSignal::Error(_))
    }

    /// `None` for JSON null.
    pub fn from_value(value: &Value) -> Option<Self> {
        if value.is_null() {
            return None;
        }
        Some(
            serde_json::from_value(value.clone())
                .unwrap_or_else(|_| SocialSignal::Other(value.clone())),
        )
    }
}

// --- Confidence ---

/// Typed confidence as persisted in `confidence_score`: a JSON integer when
/// the model gave a number, otherwise the literal text (normally "N/A").
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Confidence {
    Score(u8),
    Unscored(String),
}

impl Confidence {
    /// Interpret the raw text captured from a `CONFIDENCE:` line.
    /// Integers above 100 clamp to 100; anything non-integer stays unscored.
    pub fn from_raw(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.parse::<u64>() {
            Ok(n) => Confidence::Score(n.min(100) as u8),
            Err(_) => Confidence::Unscored(trimmed.to_string()),
        }
    }

    /// Interpret whatever a history file holds: integers, whole floats and
    /// numeric strings score (clamped to 100), null is the default, anything
    /// else is kept as text.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Null => Confidence::default(),
            Value::String(s) => Confidence::from_raw(s),
            Value::Number(n) => {
                if let Some(u) = n.as_u64() {
                    Confidence::Score(u.min(100) as u8)
                } else if let Some(f) = n
                    .as_f64()
                    .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0)
                {
                    Confidence::Score(f.min(100.0) as u8)
                } else {
                    Confidence::Unscored(n.to_string())
                }
            }
            other => Confidence::Unscored(other.to_string()),
        }
    }

    pub fn score(&self) -> Option<u8> {
        match self {
            Confidence::Score(n) => Some(*n),
            Confidence::Unscored(_) => None,
        }
    }

    pub fn level(&self) -> ConfidenceLevel {
        ConfidenceLevel::from_score(self.score().unwrap_or(0))
    }
}

impl<'de> Deserialize<'de> for Confidence {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Confidence::from_value(&Value::deserialize(deserializer)?))
    }
}

impl Default for Confidence {
    fn default() -> Self {
        Confidence::Unscored(NOT_AVAILABLE.to_string())
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Confidence::Score(n) => write!(f, "{n}"),
            Confidence::Unscored(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
}

impl ConfidenceLevel {
    pub fn from_score(score: u8) -> Self {
        if score >= 70 {
            ConfidenceLevel::High
        } else if score >= 40 {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        }
    }
}

impl std::fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfidenceLevel::Low => write!(f, "Low Confidence"),
            ConfidenceLevel::Medium => write!(f, "Medium Confidence"),
            ConfidenceLevel::High => write!(f, "High Confidence"),
        }
    }
}

// --- Verification Report ---

/// Fixed-shape fact-check report recovered from the model's free text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationReport {
    /// Text after `CONFIDENCE:` with `%` removed, unvalidated. "N/A" if absent.
    pub confidence: String,
    pub key_findings: Vec<String>,
    pub unverified_claims: Vec<String>,
    pub summary: String,
}

impl VerificationReport {
    pub fn confidence_score(&self) -> Confidence {
        Confidence::from_raw(&self.confidence)
    }
}

impl Default for VerificationReport {
    fn default() -> Self {
        Self {
            confidence: NOT_AVAILABLE.to_string(),
            key_findings: Vec::new(),
            unverified_claims: Vec::new(),
            summary: String::new(),
        }
    }
}

// --- History ---

/// One persisted run.
///
/// Decoding never fails for an object: missing or odd-typed fields fall back
/// to defaults so one unusual entry cannot hide its neighbours.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub timestamp: String,
    pub topic: String,
    pub confidence_score: Confidence,
    pub report_html: String,
    pub x_intel_data: Option<SocialSignal>,
}

impl HistoryEntry {
    /// `None` when `value` is not a JSON object.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let text = |key: &str| obj.get(key).cloned().map(value_text).unwrap_or_default();

        Some(Self {
            timestamp: text("timestamp"),
            topic: text("topic"),
            confidence_score: obj
                .get("confidence_score")
                .map(Confidence::from_value)
                .unwrap_or_default(),
            report_html: text("report_html"),
            x_intel_data: obj.get("x_intel_data").and_then(SocialSignal::from_value),
        })
    }
}

impl<'de> Deserialize<'de> for HistoryEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        HistoryEntry::from_value(&value)
            .ok_or_else(|| serde::de::Error::custom("history entry must be a JSON object"))
    }
}
