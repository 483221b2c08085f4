//! HTTP-backed source connector.
//!
//! All production sources share one wire shape: POST `{base_url}/search`
//! with the query payload, answered by a ranked result page. Per-source
//! behavior lives entirely in the downstream service.

use crate::connectors::{SearchQuery, SearchResult, SourceConnector};
use crate::types::{Error, Result};
use async_trait::async_trait;
use serde::Deserialize;

/// Result page returned by a downstream search service.
#[derive(Debug, Deserialize)]
struct SearchPage {
    #[serde(default)]
    results: Vec<SearchResult>,
}

/// Connector calling a configured downstream search service over HTTP.
#[derive(Debug, Clone)]
pub struct HttpConnector {
    name: String,
    base_url: String,
    client: reqwest::Client,
}

impl HttpConnector {
    pub fn new(name: impl Into<String>, base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            client,
        }
    }
}

#[async_trait]
impl SourceConnector for HttpConnector {
    fn name(&self) -> &str {
        &self.name
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchResult>> {
        let url = format!("{}/search", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .json(query)
            .send()
            .await
            .map_err(|e| Error::connector(format!("{}: request failed: {}", self.name, e)))?;

        if !response.status().is_success() {
            return Err(Error::connector(format!(
                "{}: upstream returned {}",
                self.name,
                response.status()
            )));
        }

        let page: SearchPage = response
            .json()
            .await
            .map_err(|e| Error::connector(format!("{}: malformed result page: {}", self.name, e)))?;

        let mut results = page.results;
        results.truncate(query.max_results as usize);
        Ok(results)
    }
}
