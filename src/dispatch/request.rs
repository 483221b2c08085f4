//! Tool request arguments and bounds validation.

use crate::types::{Error, LimitsConfig, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Parsed arguments of a workplace search invocation.
///
/// Bounds are validated before any authorization check; malformed input is
/// never evaluated for scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Search query text.
    pub query: String,
    /// Source connector names to fan out to, in response order.
    #[serde(default)]
    pub sources: Vec<String>,
    /// Maximum number of results in the merged response.
    #[serde(default = "default_max_results")]
    pub max_results: u32,
    /// Pass-through hint forwarded to connectors.
    #[serde(default = "default_include_content")]
    pub include_content: bool,
}

fn default_max_results() -> u32 {
    10
}

fn default_include_content() -> bool {
    true
}

impl SearchRequest {
    /// Validate request bounds against configured limits.
    ///
    /// Source-name membership is checked separately by the dispatcher when
    /// resolving connectors; everything else lives here.
    pub fn validate_bounds(&self, limits: &LimitsConfig) -> Result<()> {
        if self.query.is_empty() {
            return Err(Error::validation("query must not be empty"));
        }
        let query_chars = self.query.chars().count();
        if query_chars > limits.max_query_chars {
            return Err(Error::validation(format!(
                "query length {} exceeds maximum {}",
                query_chars, limits.max_query_chars
            )));
        }
        if self.max_results < 1 || self.max_results > limits.max_results_ceiling {
            return Err(Error::validation(format!(
                "max_results must be between 1 and {}, got {}",
                limits.max_results_ceiling, self.max_results
            )));
        }
        if self.sources.is_empty() {
            return Err(Error::validation("sources must not be empty"));
        }
        if self.sources.len() > limits.max_sources {
            return Err(Error::validation(format!(
                "at most {} sources per request, got {}",
                limits.max_sources,
                self.sources.len()
            )));
        }
        let mut seen = HashSet::new();
        for source in &self.sources {
            if !seen.insert(source.as_str()) {
                return Err(Error::validation(format!(
                    "duplicate source '{}' in request",
                    source
                )));
            }
        }
        Ok(())
    }
}
