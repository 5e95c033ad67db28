// Trait seams for the verification pipeline.
//
// WebSearcher wraps the search provider; text providers come in through
// ai_client::CompletionModel. Both let the pipeline run against the mocks in
// `testing` with no network.

use anyhow::Result;
use async_trait::async_trait;

use counterpoint_common::{CounterpointError, EvidenceItem};
use tavily_client::{SearchRequest, TavilyClient};

// ---------------------------------------------------------------------------
// WebSearcher
// ---------------------------------------------------------------------------

#[async_trait]
pub trait WebSearcher: Send + Sync {
    /// Run one search and map hits into evidence.
    async fn search(&self, request: &SearchRequest) -> Result<Vec<EvidenceItem>>;
}

#[async_trait]
impl WebSearcher for TavilyClient {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<EvidenceItem>> {
        let response = TavilyClient::search(self, request)
            .await
            .map_err(|e| CounterpointError::Transport(e.to_string()))?;

        Ok(response
            .results
            .into_iter()
            .map(|r| EvidenceItem {
                url: r.url,
                title: r.title,
                content: r.content,
            })
            .collect())
    }
}
