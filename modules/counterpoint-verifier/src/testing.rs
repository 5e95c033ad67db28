// Test mocks for the verification pipeline.
//
// Two mocks matching the two trait boundaries:
// - MockSearcher (WebSearcher): scripted recent/unscoped results, records requests
// - MockModel (CompletionModel): scripted reply or failure, records conversations
//
// Plus small builders for evidence and raw model reports.

use std::sync::Mutex;

use anyhow::{bail, Result};
use async_trait::async_trait;

use ai_client::{AiError, CompletionModel, Message};
use counterpoint_common::EvidenceItem;
use tavily_client::SearchRequest;

use crate::traits::WebSearcher;

// ---------------------------------------------------------------------------
// MockSearcher
// ---------------------------------------------------------------------------

/// Answers time-scoped requests with `recent` and unscoped ones with
/// `unscoped`. Unscripted tiers return no results.
pub struct MockSearcher {
    recent: Option<Vec<EvidenceItem>>,
    unscoped: Option<Vec<EvidenceItem>>,
    fail_recent: bool,
    fail_unscoped: bool,
    requests: Mutex<Vec<SearchRequest>>,
}

impl MockSearcher {
    pub fn new() -> Self {
        Self {
            recent: None,
            unscoped: None,
            fail_recent: false,
            fail_unscoped: false,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn on_recent(mut self, items: Vec<EvidenceItem>) -> Self {
        self.recent = Some(items);
        self
    }

    pub fn on_unscoped(mut self, items: Vec<EvidenceItem>) -> Self {
        self.unscoped = Some(items);
        self
    }

    /// Every request fails.
    pub fn failing(mut self) -> Self {
        self.fail_recent = true;
        self.fail_unscoped = true;
        self
    }

    /// Only the unscoped fallback fails.
    pub fn failing_unscoped(mut self) -> Self {
        self.fail_unscoped = true;
        self
    }

    /// Requests received so far, in order.
    pub fn requests(&self) -> Vec<SearchRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Default for MockSearcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WebSearcher for MockSearcher {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<EvidenceItem>> {
        self.requests.lock().unwrap().push(request.clone());

        let (fail, items) = if request.time_range.is_some() {
            (self.fail_recent, &self.recent)
        } else {
            (self.fail_unscoped, &self.unscoped)
        };
        if fail {
            bail!("connection reset by peer");
        }
        Ok(items.clone().unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// MockModel
// ---------------------------------------------------------------------------

pub struct MockModel {
    reply: std::result::Result<String, String>,
    calls: Mutex<Vec<Vec<Message>>>,
}

impl MockModel {
    pub fn replying(text: impl Into<String>) -> Self {
        Self {
            reply: Ok(text.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            reply: Err(message.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Conversations received so far.
    pub fn calls(&self) -> Vec<Vec<Message>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionModel for MockModel {
    async fn complete(&self, messages: &[Message]) -> ai_client::Result<String> {
        self.calls.lock().unwrap().push(messages.to_vec());
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(message) => Err(AiError::Network(message.clone())),
        }
    }

    fn provider(&self) -> &'static str {
        "mock"
    }
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

/// `n` distinct evidence items on news.example.
pub fn evidence(n: usize) -> Vec<EvidenceItem> {
    (0..n)
        .map(|i| EvidenceItem {
            url: format!("https://www.news.example/story-{i}"),
            title: format!("Story {i}"),
            content: format!("Reported detail number {i}."),
        })
        .collect()
}

/// A well-formed synthesizer reply.
pub fn report_text(confidence: &str, findings: &[&str], unverified: &[&str], summary: &str) -> String {
    let mut text = format!("CONFIDENCE: {confidence}\n\nKEY FINDINGS:\n");
    for f in findings {
        text.push_str(&format!("• {f}\n"));
    }
    text.push_str("\nUNVERIFIED:\n");
    for u in unverified {
        text.push_str(&format!("• {u}\n"));
    }
    text.push_str(&format!("\nSUMMARY:\n{summary}\n"));
    text
}
