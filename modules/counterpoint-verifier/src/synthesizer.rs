use std::sync::Arc;

use tracing::{info, warn};

use ai_client::{truncate_to_char_boundary, CompletionModel, Gemini, Message};
use counterpoint_common::{Config, EvidenceItem, Topic};

/// Per-document cap on content passed as context.
const MAX_CONTENT_BYTES: usize = 4_000;

/// Asks the generative-text provider for a fact-check written in the
/// `CONFIDENCE / KEY FINDINGS / UNVERIFIED / SUMMARY` layout the
/// normalizer reads. Never fails: errors come back as text.
pub struct Synthesizer {
    model: Option<Arc<dyn CompletionModel>>,
}

impl Synthesizer {
    pub fn new(model: Option<Arc<dyn CompletionModel>>) -> Self {
        Self { model }
    }

    pub fn from_config(config: &Config) -> Self {
        let model = config.gemini_api_key.as_deref().map(|key| {
            Arc::new(
                Gemini::new(key, &config.file.models.synthesis).with_timeout(config.http_timeout()),
            ) as Arc<dyn CompletionModel>
        });
        Self::new(model)
    }

    pub fn is_configured(&self) -> bool {
        self.model.is_some()
    }

    pub async fn synthesize(&self, topic: &Topic, evidence: &[EvidenceItem]) -> String {
        let Some(model) = self.model.as_ref() else {
            return "Error: GEMINI_API_KEY missing.".to_string();
        };

        info!(
            topic = topic.as_str(),
            sources = evidence.len(),
            provider = model.provider(),
            "Synthesizing verification report"
        );

        match model.complete(&[Message::user(build_prompt(topic, evidence))]).await {
            Ok(text) => text,
            Err(e) => {
                warn!(topic = topic.as_str(), error = %e, "Synthesis request failed");
                format!("Error connecting to generative-text provider: {e}")
            }
        }
    }
}

pub fn build_prompt(topic: &Topic, evidence: &[EvidenceItem]) -> String {
    let context: Vec<EvidenceItem> = evidence
        .iter()
        .map(|item| EvidenceItem {
            url: item.url.clone(),
            title: item.title.clone(),
            content: truncate_to_char_boundary(&item.content, MAX_CONTENT_BYTES).to_string(),
        })
        .collect();
    let context = serde_json::to_string_pretty(&context).unwrap_or_default();

    format!(
        r#"You are a professional news verification analyst. Analyze these search results about '{topic}'.

Provide a structured report with:
1. KEY FINDINGS: 3-5 bullet points of verified facts
2. UNVERIFIED CLAIMS: Any rumors or unverified information found
3. CONFIDENCE SCORE: A number from 0-100 based on source reliability

Format your response EXACTLY as:
CONFIDENCE: [number]

KEY FINDINGS:
• [finding 1]
• [finding 2]
• [finding 3]

UNVERIFIED:
• [claim 1] - [reason why unverified]

SUMMARY:
[2-3 sentence conclusion]

Context:
{context}
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{evidence, MockModel};

    fn topic() -> Topic {
        Topic::new("Dubai storm").unwrap()
    }

    #[test]
    fn prompt_carries_layout_and_context() {
        let prompt = build_prompt(&topic(), &evidence(2));

        assert!(prompt.contains("about 'Dubai storm'"));
        assert!(prompt.contains("CONFIDENCE: [number]"));
        assert!(prompt.contains("KEY FINDINGS:\n•"));
        assert!(prompt.contains("UNVERIFIED:\n•"));
        assert!(prompt.contains("SUMMARY:\n"));
        assert!(prompt.contains("https://www.news.example/story-1"));
    }

    #[test]
    fn prompt_truncates_long_content() {
        let long = vec![EvidenceItem {
            url: "https://a.example".into(),
            title: "Long".into(),
            content: "x".repeat(MAX_CONTENT_BYTES * 2),
        }];
        let prompt = build_prompt(&topic(), &long);
        assert!(!prompt.contains(&"x".repeat(MAX_CONTENT_BYTES + 1)));
        assert!(prompt.contains(&"x".repeat(MAX_CONTENT_BYTES)));
    }

    #[tokio::test]
    async fn returns_model_text() {
        let model = Arc::new(MockModel::replying("CONFIDENCE: 90"));
        let synth = Synthesizer::new(Some(model.clone() as Arc<dyn CompletionModel>));

        assert_eq!(synth.synthesize(&topic(), &evidence(1)).await, "CONFIDENCE: 90");
        assert_eq!(model.calls().len(), 1);
    }

    #[tokio::test]
    async fn failures_become_text() {
        let synth = Synthesizer::new(Some(
            Arc::new(MockModel::failing("503")) as Arc<dyn CompletionModel>
        ));
        let text = synth.synthesize(&topic(), &evidence(1)).await;
        assert!(text.starts_with("Error connecting to generative-text provider"));

        let unconfigured = Synthesizer::new(None);
        assert_eq!(
            unconfigured.synthesize(&topic(), &[]).await,
            "Error: GEMINI_API_KEY missing."
        );
    }
}
