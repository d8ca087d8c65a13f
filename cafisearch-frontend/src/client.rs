///! HTTP client for the search API
///!
///! The UI never shows backend failures: every error is logged and the
///! caller receives an empty result set.

use cafisearch_common::{Place, SearchResponse};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET {base_url}/search?query=...`, empty on any failure
    pub async fn search_cafes(&self, query: &str) -> Vec<Place> {
        match self.try_search(query).await {
            Ok(results) => results,
            Err(e) => {
                tracing::error!("Error searching cafes for '{}': {}", query, e);
                Vec::new()
            }
        }
    }

    async fn try_search(&self, query: &str) -> Result<Vec<Place>, reqwest::Error> {
        let response = self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&[("query", query)])
            .send()
            .await?
            .error_for_status()?;
        let body: SearchResponse = response.json().await?;
        tracing::debug!("Received {} results for '{}'", body.results.len(), query);
        Ok(body.results)
    }
}
