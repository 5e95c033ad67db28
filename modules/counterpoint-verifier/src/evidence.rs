//! Evidence fetcher: web articles for a topic, recent first.
//!
//! Two tiers. The first search is scoped to the past year; when it comes back
//! thin, an unscoped search replaces it. Transport failures never escape:
//! they are logged and reported as "no evidence".

use std::sync::Arc;

use tracing::{info, warn};

use counterpoint_common::file_config::SearchConfig;
use counterpoint_common::{Config, CounterpointError, EvidenceItem, Topic};
use tavily_client::{SearchDepth, SearchRequest, TavilyClient, TimeRange};

use crate::traits::WebSearcher;

pub struct EvidenceFetcher {
    searcher: Option<Arc<dyn WebSearcher>>,
    settings: SearchConfig,
}

impl EvidenceFetcher {
    pub fn new(searcher: Option<Arc<dyn WebSearcher>>, settings: SearchConfig) -> Self {
        Self { searcher, settings }
    }

    pub fn from_config(config: &Config) -> Self {
        let searcher = config.tavily_api_key.as_deref().map(|key| {
            Arc::new(TavilyClient::new(key).with_timeout(config.http_timeout()))
                as Arc<dyn WebSearcher>
        });
        Self::new(searcher, config.file.search.clone())
    }

    pub fn is_configured(&self) -> bool {
        self.searcher.is_some()
    }

    /// Fetch evidence for `topic`.
    ///
    /// `Err(ConfigurationMissing)` only when no search key is configured;
    /// every other failure yields `Ok(vec![])`.
    pub async fn fetch(&self, topic: &Topic) -> Result<Vec<EvidenceItem>, CounterpointError> {
        let Some(searcher) = self.searcher.as_ref() else {
            return Err(CounterpointError::ConfigurationMissing("TAVILY_API_KEY"));
        };

        let recent = match searcher
            .search(&self.request(topic).time_range(TimeRange::Year))
            .await
        {
            Ok(items) => items,
            Err(e) => {
                warn!(topic = topic.as_str(), error = %e, "Recent search failed");
                return Ok(Vec::new());
            }
        };

        if recent.len() >= self.settings.min_recent_results {
            info!(topic = topic.as_str(), count = recent.len(), "Recent evidence found");
            return Ok(recent);
        }

        info!(
            topic = topic.as_str(),
            recent = recent.len(),
            threshold = self.settings.min_recent_results,
            "Too few recent results, retrying without time filter"
        );

        match searcher.search(&self.request(topic)).await {
            Ok(items) => {
                info!(topic = topic.as_str(), count = items.len(), "Unscoped evidence found");
                Ok(items)
            }
            Err(e) => {
                warn!(topic = topic.as_str(), error = %e, "Unscoped search failed");
                Ok(Vec::new())
            }
        }
    }

    fn request(&self, topic: &Topic) -> SearchRequest {
        let depth = match self.settings.search_depth.as_str() {
            "basic" => SearchDepth::Basic,
            _ => SearchDepth::Advanced,
        };
        SearchRequest::new(topic.as_str())
            .search_depth(depth)
            .max_results(self.settings.max_results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{evidence, MockSearcher};

    fn fetcher(searcher: &Arc<MockSearcher>) -> EvidenceFetcher {
        EvidenceFetcher::new(
            Some(searcher.clone() as Arc<dyn WebSearcher>),
            SearchConfig::default(),
        )
    }

    fn topic() -> Topic {
        Topic::new("Dubai storm").unwrap()
    }

    #[tokio::test]
    async fn enough_recent_results_skip_fallback() {
        let searcher = Arc::new(MockSearcher::new().on_recent(evidence(3)));
        let items = fetcher(&searcher).fetch(&topic()).await.unwrap();

        assert_eq!(items.len(), 3);
        let requests = searcher.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].time_range, Some(TimeRange::Year));
        assert_eq!(requests[0].max_results, 10);
        assert_eq!(requests[0].search_depth, SearchDepth::Advanced);
    }

    #[tokio::test]
    async fn sparse_recent_results_are_replaced_not_merged() {
        let unscoped = vec![EvidenceItem {
            url: "https://archive.example/1".into(),
            title: "Older coverage".into(),
            content: "from 2019".into(),
        }];
        let searcher = Arc::new(
            MockSearcher::new()
                .on_recent(evidence(2))
                .on_unscoped(unscoped.clone()),
        );
        let items = fetcher(&searcher).fetch(&topic()).await.unwrap();

        assert_eq!(items, unscoped);
        let requests = searcher.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].time_range, Some(TimeRange::Year));
        assert_eq!(requests[1].time_range, None);
        assert_eq!(requests[1].query, "Dubai storm");
    }

    #[tokio::test]
    async fn transport_failure_yields_empty() {
        let searcher = Arc::new(MockSearcher::new().failing());
        let items = fetcher(&searcher).fetch(&topic()).await.unwrap();

        assert!(items.is_empty());
        assert_eq!(searcher.requests().len(), 1);
    }

    #[tokio::test]
    async fn fallback_failure_yields_empty() {
        let searcher = Arc::new(MockSearcher::new().on_recent(evidence(1)).failing_unscoped());
        let items = fetcher(&searcher).fetch(&topic()).await.unwrap();

        assert!(items.is_empty());
        assert_eq!(searcher.requests().len(), 2);
    }

    #[tokio::test]
    async fn missing_key_is_unavailable() {
        let fetcher = EvidenceFetcher::new(None, SearchConfig::default());
        assert!(!fetcher.is_configured());

        let err = fetcher.fetch(&topic()).await.unwrap_err();
        assert!(matches!(
            err,
            CounterpointError::ConfigurationMissing("TAVILY_API_KEY")
        ));
    }
}
