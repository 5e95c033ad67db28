//! Social-signal fetcher: what X is saying about a topic, via Grok.
//!
//! The model is asked for bare JSON. Responses are unfenced, parsed, and
//! every failure comes back as an error-shaped [`SocialSignal`] the display
//! can show inline. No retries.

use std::sync::Arc;

use tracing::{info, warn};

use ai_client::{strip_code_fence, CompletionModel, Message, OpenAi};
use counterpoint_common::{Config, CounterpointError, SocialSignal, Topic};

const SYSTEM_PROMPT: &str = "You are an investigative journalist tool with access to real-time X (Twitter) data. Analyze the latest posts about the user's topic.";

fn user_prompt(topic: &Topic) -> String {
    format!(
        r#"Find the latest viral posts and sentiment regarding '{topic}' on X. Return a JSON object with this structure:
{{
   "x_summary": "2 sentence summary of what people are saying on X",
   "viral_rumors": ["Rumor 1", "Rumor 2"],
   "sources": [
      {{"handle": "@username", "link": "https://x.com/user/status/xxx", "text": "snippet of tweet"}}
   ]
}}

IMPORTANT: Return ONLY the JSON object, no other text."#
    )
}

pub struct SocialSignalFetcher {
    model: Option<Arc<dyn CompletionModel>>,
}

impl SocialSignalFetcher {
    pub fn new(model: Option<Arc<dyn CompletionModel>>) -> Self {
        Self { model }
    }

    pub fn from_config(config: &Config) -> Self {
        let model = config.xai_api_key.as_deref().map(|key| {
            Arc::new(OpenAi::xai(key, &config.file.models.social).with_timeout(config.http_timeout()))
                as Arc<dyn CompletionModel>
        });
        Self::new(model)
    }

    pub async fn fetch(&self, topic: &Topic) -> SocialSignal {
        let Some(model) = self.model.as_ref() else {
            return SocialSignal::error("XAI_API_KEY not configured");
        };

        info!(topic = topic.as_str(), provider = model.provider(), "Fetching social signal");

        let messages = [Message::system(SYSTEM_PROMPT), Message::user(user_prompt(topic))];
        match model.complete(&messages).await {
            Ok(text) => parse_social_signal(&text),
            Err(e) => {
                warn!(topic = topic.as_str(), error = %e, "Social signal request failed");
                SocialSignal::error(format!("Error calling social signal provider: {e}"))
            }
        }
    }
}

/// Parse a model reply into a signal. Unparseable text is kept as `raw`.
pub fn parse_social_signal(text: &str) -> SocialSignal {
    match decode_social_signal(text) {
        Ok(signal) => signal,
        Err(CounterpointError::MalformedResponse { detail, raw }) => {
            warn!(error = %detail, chars = text.len(), "Social signal response was not JSON");
            SocialSignal::error_with_raw(
                format!("Failed to parse social signal response: {detail}"),
                raw,
            )
        }
        Err(e) => SocialSignal::error(e.to_string()),
    }
}

fn decode_social_signal(text: &str) -> Result<SocialSignal, CounterpointError> {
    let body = strip_code_fence(text);
    let malformed = |detail: String| CounterpointError::MalformedResponse {
        detail,
        raw: body.to_string(),
    };

    match serde_json::from_str::<SocialSignal>(body).map_err(|e| malformed(e.to_string()))? {
        SocialSignal::Other(value) => Err(malformed(format!(
            "expected a JSON object, got {}",
            json_kind(&value)
        ))),
        signal => Ok(signal),
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
