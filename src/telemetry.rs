//! Telemetry sink — observability gateway integration.
//!
//! Every tool invocation emits a request and a response record. The sink is
//! an injected collaborator behind a narrow trait; telemetry failures are
//! logged and swallowed, never propagated into the caller's response.

use crate::types::{RequestId, TelemetryConfig, UserId, SERVER_NAME, SERVER_VERSION};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use std::fmt;

/// Record emitted when a tool invocation is received.
#[derive(Debug, Clone)]
pub struct RequestRecord {
    pub request_id: RequestId,
    pub user: UserId,
    pub tool: String,
    pub arguments: Value,
}

/// Record emitted when a tool invocation completes.
#[derive(Debug, Clone)]
pub struct ResponseRecord {
    pub request_id: RequestId,
    pub user: UserId,
    pub tool: String,
    pub success: bool,
    pub execution_time_ms: u64,
}

/// Observability gateway seam.
#[async_trait]
pub trait TelemetrySink: Send + Sync {
    async fn record_request(&self, record: &RequestRecord);
    async fn record_response(&self, record: &ResponseRecord);
}

/// Sink for deployments without an observability gateway, and for tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTelemetry;

#[async_trait]
impl TelemetrySink for NoopTelemetry {
    async fn record_request(&self, _record: &RequestRecord) {}
    async fn record_response(&self, _record: &ResponseRecord) {}
}

/// HTTP sink posting records to an observability gateway (e.g. Cequence).
#[derive(Clone)]
pub struct HttpTelemetry {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl HttpTelemetry {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            client,
        }
    }

    /// Build the sink from configuration; `None` when no gateway is set.
    pub fn from_config(config: &TelemetryConfig, client: reqwest::Client) -> Option<Self> {
        config
            .gateway_url
            .as_ref()
            .map(|url| Self::new(url.clone(), config.api_key.clone(), client))
    }

    async fn post(&self, path: &str, payload: Value) {
        let url = format!("{}{}", self.base_url.trim_end_matches('/'), path);
        match self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
        {
            Ok(response) if !response.status().is_success() => {
                tracing::warn!(
                    "Telemetry gateway returned {} for {}",
                    response.status(),
                    path
                );
            }
            Ok(_) => {}
            Err(err) => {
                tracing::warn!("Failed to reach telemetry gateway: {}", err);
            }
        }
    }
}

impl fmt::Debug for HttpTelemetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTelemetry")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl TelemetrySink for HttpTelemetry {
    async fn record_request(&self, record: &RequestRecord) {
        let payload = serde_json::json!({
            "timestamp": Utc::now().to_rfc3339(),
            "request_id": record.request_id,
            "user_id": record.user,
            "tool_name": record.tool,
            "request_data": { "arguments": record.arguments },
            "server_name": SERVER_NAME,
            "server_version": SERVER_VERSION,
        });
        self.post("/api/v1/mcp/requests", payload).await;
    }

    async fn record_response(&self, record: &ResponseRecord) {
        let payload = serde_json::json!({
            "timestamp": Utc::now().to_rfc3339(),
            "request_id": record.request_id,
            "user_id": record.user,
            "tool_name": record.tool,
            "success": record.success,
            "execution_time_ms": record.execution_time_ms,
            "server_name": SERVER_NAME,
            "server_version": SERVER_VERSION,
        });
        self.post("/api/v1/mcp/responses", payload).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_record() -> RequestRecord {
        RequestRecord {
            request_id: RequestId::new(),
            user: UserId::from_string("user-1".to_string()).unwrap(),
            tool: "workplace_search".to_string(),
            arguments: serde_json::json!({"query": "q"}),
        }
    }

    #[test]
    fn test_from_config_disabled_without_url() {
        let config = TelemetryConfig::default();
        assert!(HttpTelemetry::from_config(&config, reqwest::Client::new()).is_none());

        let config = TelemetryConfig {
            gateway_url: Some("https://gateway.example.com".to_string()),
            api_key: "key".to_string(),
        };
        assert!(HttpTelemetry::from_config(&config, reqwest::Client::new()).is_some());
    }

    #[tokio::test]
    async fn test_gateway_failure_is_swallowed() {
        // Nothing listens here; the record call must still complete.
        let sink = HttpTelemetry::new("http://127.0.0.1:1", "key", reqwest::Client::new());
        sink.record_request(&request_record()).await;
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let sink = HttpTelemetry::new("http://gw", "secret-key", reqwest::Client::new());
        let rendered = format!("{:?}", sink);
        assert!(!rendered.contains("secret-key"));
    }
}
