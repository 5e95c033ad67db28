pub mod error;
pub mod types;

pub use error::{Result, TavilyError};
pub use types::{SearchDepth, SearchRequest, SearchResponse, SearchResult, TimeRange};

use std::time::Duration;

use tracing::{debug, info};

use types::AuthenticatedRequest;

const BASE_URL: &str = "https://api.tavily.com";

pub struct TavilyClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl TavilyClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run a web search via `POST /search`.
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        info!(
            query = request.query.as_str(),
            max_results = request.max_results,
            time_range = ?request.time_range,
            "Tavily search"
        );

        let body = AuthenticatedRequest {
            api_key: &self.api_key,
            request,
        };

        let resp = self
            .client
            .post(format!("{}/search", self.base_url))
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(TavilyError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let text = resp.text().await?;
        let data: SearchResponse = serde_json::from_str(&text)?;

        debug!(count = data.results.len(), "Tavily search complete");
        Ok(data)
    }
}
