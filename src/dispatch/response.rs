//! Aggregate search reports and the MCP response envelope.

use crate::connectors::SearchResult;
use crate::types::Result;
use serde::{Deserialize, Serialize};

/// A recorded per-source failure. Surfaced in aggregate metadata; never
/// fails the whole response on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFailure {
    pub source: String,
    pub reason: String,
}

/// Aggregated outcome of one authorized fan-out.
///
/// Result items preserve the order of the requested sources, regardless of
/// the order in which connector calls completed. Constructed fresh per
/// request; never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct SearchReport {
    pub query: String,
    pub sources: Vec<String>,
    pub results: Vec<SearchResult>,
    pub total_count: usize,
    pub failures: Vec<SourceFailure>,
    pub execution_time_ms: u64,
}

impl SearchReport {
    /// True when every requested source failed. Only then is the aggregate
    /// response marked as an error.
    pub fn all_sources_failed(&self) -> bool {
        !self.sources.is_empty() && self.failures.len() == self.sources.len()
    }
}

/// MCP response envelope: ordered content items plus an error flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResponse {
    pub content: Vec<ContentItem>,
    #[serde(rename = "isError")]
    pub is_error: bool,
}

/// One content item in the response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentItem {
    Text { text: String },
    Resource { resource: ResourceContent },
}

/// Structured resource payload embedded in the envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceContent {
    pub uri: String,
    pub name: String,
    #[serde(rename = "mimeType")]
    pub mime_type: String,
    pub text: String,
}

impl ToolResponse {
    /// Shape an aggregate report into the response envelope.
    ///
    /// Partial success is surfaced, not hidden: failed sources are named in
    /// the summary and recorded in the embedded report. When all sources
    /// failed the envelope is marked as an error with no content items.
    pub fn from_report(report: &SearchReport) -> Result<Self> {
        if report.all_sources_failed() {
            return Ok(Self {
                content: Vec::new(),
                is_error: true,
            });
        }

        let mut summary = format!(
            "Found {} results for '{}'",
            report.total_count, report.query
        );
        if !report.failures.is_empty() {
            let failed: Vec<&str> = report.failures.iter().map(|f| f.source.as_str()).collect();
            summary.push_str(&format!(
                " ({} of {} sources failed: {})",
                report.failures.len(),
                report.sources.len(),
                failed.join(", ")
            ));
        }

        let resource = ResourceContent {
            uri: format!("workplace://search/{}", report.query),
            name: "Search Results".to_string(),
            mime_type: "application/json".to_string(),
            text: serde_json::to_string_pretty(report)?,
        };

        Ok(Self {
            content: vec![
                ContentItem::Text { text: summary },
                ContentItem::Resource { resource },
            ],
            is_error: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn result(source: &str, title: &str) -> SearchResult {
        SearchResult {
            title: title.to_string(),
            source: source.to_string(),
            url: format!("https://example.com/{}", title),
            snippet: "snippet".to_string(),
            score: 0.9,
            last_modified: None,
            content: None,
        }
    }

    fn report(results: Vec<SearchResult>, failures: Vec<SourceFailure>) -> SearchReport {
        let total_count = results.len();
        SearchReport {
            query: "roadmap".to_string(),
            sources: vec!["google_drive".to_string(), "notion".to_string()],
            results,
            total_count,
            failures,
            execution_time_ms: 12,
        }
    }

    #[test]
    fn test_success_envelope() {
        let report = report(vec![result("google_drive", "doc")], Vec::new());
        let response = ToolResponse::from_report(&report).unwrap();

        assert!(!response.is_error);
        assert_eq!(response.content.len(), 2);
        let ContentItem::Text { text } = &response.content[0] else {
            panic!("expected text item first");
        };
        assert_eq!(text, "Found 1 results for 'roadmap'");
    }

    #[test]
    fn test_partial_failure_named_in_summary() {
        let report = report(
            vec![result("google_drive", "doc")],
            vec![SourceFailure {
                source: "notion".to_string(),
                reason: "timed out".to_string(),
            }],
        );
        let response = ToolResponse::from_report(&report).unwrap();

        assert!(!response.is_error);
        let ContentItem::Text { text } = &response.content[0] else {
            panic!("expected text item first");
        };
        assert!(text.contains("1 of 2 sources failed: notion"));
    }

    #[test]
    fn test_all_failed_envelope_is_error_with_no_content() {
        let report = report(
            Vec::new(),
            vec![
                SourceFailure {
                    source: "google_drive".to_string(),
                    reason: "boom".to_string(),
                },
                SourceFailure {
                    source: "notion".to_string(),
                    reason: "boom".to_string(),
                },
            ],
        );
        let response = ToolResponse::from_report(&report).unwrap();

        assert!(response.is_error);
        assert!(response.content.is_empty());
    }

    #[test]
    fn test_envelope_wire_shape() {
        let report = report(vec![result("notion", "page")], Vec::new());
        let response = ToolResponse::from_report(&report).unwrap();
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["isError"], false);
        assert_eq!(value["content"][0]["type"], "text");
        assert_eq!(value["content"][1]["type"], "resource");
        assert_eq!(
            value["content"][1]["resource"]["mimeType"],
            "application/json"
        );
        assert_eq!(
            value["content"][1]["resource"]["uri"],
            "workplace://search/roadmap"
        );
    }
}
