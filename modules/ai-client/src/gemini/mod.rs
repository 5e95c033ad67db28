mod client;
pub(crate) mod types;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::{AiError, Result};
use crate::traits::{CompletionModel, Message, MessageRole};

use client::GeminiClient;
use types::*;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

// =============================================================================
// Gemini Agent
// =============================================================================

#[derive(Clone)]
pub struct Gemini {
    api_key: String,
    pub(crate) model: String,
    base_url: Option<String>,
    timeout: Duration,
    http: reqwest::Client,
}

impl Gemini {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: None,
            timeout: DEFAULT_TIMEOUT,
            http: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub(crate) fn client(&self) -> GeminiClient {
        let client = GeminiClient::new(&self.api_key, self.http.clone(), self.timeout);
        if let Some(ref url) = self.base_url {
            client.with_base_url(url)
        } else {
            client
        }
    }
}

/// Gemini keeps system text out of `contents`; everything else maps onto
/// user/model turns.
fn build_request(messages: &[Message]) -> GenerateRequest {
    let mut system = Vec::new();
    let mut contents = Vec::new();

    for msg in messages {
        match msg.role {
            MessageRole::System => system.push(msg.content.as_str()),
            MessageRole::User => contents.push(Content::user(&msg.content)),
            MessageRole::Assistant => contents.push(Content::model(&msg.content)),
        }
    }

    GenerateRequest {
        contents,
        system_instruction: if system.is_empty() {
            None
        } else {
            Some(Content::instruction(system.join("\n\n")))
        },
    }
}

#[async_trait]
impl CompletionModel for Gemini {
    async fn complete(&self, messages: &[Message]) -> Result<String> {
        let request = build_request(messages);
        let response = self.client().generate(&self.model, &request).await?;

        response.text().ok_or(AiError::EmptyResponse("gemini"))
    }

    fn provider(&self) -> &'static str {
        "gemini"
    }
}
