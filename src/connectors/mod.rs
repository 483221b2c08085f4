//! Source connectors — external workplace data source adapters.
//!
//! A connector is a named downstream capability (Google Drive, Notion,
//! SharePoint) behind a narrow async trait. Connectors are invoked only
//! after the dispatcher has authorized the corresponding scope; they are
//! opaque remote services returning ranked results.

pub mod health;
pub mod registry;

mod http;

pub use health::{ConnectorHealthTracker, HealthConfig, HealthStatus, SystemHealthReport};
pub use http::HttpConnector;
pub use registry::ConnectorRegistry;

use crate::types::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Query handed to a connector after validation and authorization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Search query text.
    pub query: String,
    /// Maximum results this connector should return.
    pub max_results: u32,
    /// Pass-through hint: whether to include document content. The
    /// dispatcher neither strips nor synthesizes content.
    pub include_content: bool,
}

/// A single ranked search result from one source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub source: String,
    pub url: String,
    pub snippet: String,
    pub score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// An external search service adapter for one workplace data source.
#[async_trait]
pub trait SourceConnector: Send + Sync {
    /// Connector name; doubles as the resource segment of its required scope.
    fn name(&self) -> &str;

    /// Execute a search against the downstream service.
    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchResult>>;
}
