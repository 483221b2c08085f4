//! Configuration structures.
//!
//! Configuration is loaded from environment variables; every knob the
//! dispatcher enforces (bounds, timeouts, endpoints) is externally supplied,
//! never hard-coded at the call site.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Server identity reported by `/mcp/info` and telemetry records.
pub const SERVER_NAME: &str = "workplace-search";

/// Server version, taken from the crate manifest.
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Global gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Credential verification configuration.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Source connector endpoints and timeouts.
    #[serde(default)]
    pub connectors: ConnectorsConfig,

    /// Request bounds enforced before authorization.
    #[serde(default)]
    pub limits: LimitsConfig,

    /// Observability gateway (telemetry sink) configuration.
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP bind address.
    pub listen_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8080".to_string(),
        }
    }
}

/// Credential verification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// External token-verification endpoint. The verifier receives the
    /// bearer token and answers validity + granted scopes + expiry.
    pub verifier_url: String,

    /// Timeout for a single verification call.
    #[serde(with = "humantime_serde")]
    pub verify_timeout: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            verifier_url: "http://127.0.0.1:9100/v1/verify".to_string(),
            verify_timeout: Duration::from_secs(5),
        }
    }
}

/// Source connector endpoints. A connector is registered only when its base
/// URL is configured.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectorsConfig {
    /// Google Drive search service base URL.
    pub google_drive_url: Option<String>,

    /// Notion search service base URL.
    pub notion_url: Option<String>,

    /// SharePoint search service base URL.
    pub sharepoint_url: Option<String>,
}

impl Default for ConnectorsConfig {
    fn default() -> Self {
        Self {
            google_drive_url: Some("http://127.0.0.1:9101".to_string()),
            notion_url: Some("http://127.0.0.1:9102".to_string()),
            sharepoint_url: None,
        }
    }
}

/// Request bounds and deadlines enforced by the dispatcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Maximum number of sources per request.
    pub max_sources: usize,

    /// Upper bound for the `max_results` argument.
    pub max_results_ceiling: u32,

    /// Maximum query length in characters.
    pub max_query_chars: usize,

    /// Timeout applied to each connector call independently.
    #[serde(with = "humantime_serde")]
    pub connector_timeout: Duration,

    /// Overall deadline for a single tool invocation (all connectors).
    #[serde(with = "humantime_serde")]
    pub request_deadline: Duration,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_sources: 5,
            max_results_ceiling: 50,
            max_query_chars: 500,
            connector_timeout: Duration::from_secs(10),
            request_deadline: Duration::from_secs(30),
        }
    }
}

/// Observability gateway configuration. Telemetry is disabled when no
/// gateway URL is configured.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TelemetryConfig {
    /// Gateway base URL (e.g. a Cequence deployment).
    pub gateway_url: Option<String>,

    /// API key sent as a bearer credential to the gateway.
    #[serde(default)]
    pub api_key: String,
}

impl Config {
    /// Load configuration from `WORKGATE_*` environment variables, falling
    /// back to defaults for anything unset. Unparseable numeric values are
    /// logged and replaced with the default rather than aborting startup.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server: ServerConfig {
                listen_addr: env_string("WORKGATE_LISTEN_ADDR", defaults.server.listen_addr),
            },
            auth: AuthConfig {
                verifier_url: env_string("WORKGATE_VERIFIER_URL", defaults.auth.verifier_url),
                verify_timeout: env_millis("WORKGATE_VERIFY_TIMEOUT_MS", defaults.auth.verify_timeout),
            },
            connectors: ConnectorsConfig {
                google_drive_url: env_opt("WORKGATE_GOOGLE_DRIVE_URL")
                    .or(defaults.connectors.google_drive_url),
                notion_url: env_opt("WORKGATE_NOTION_URL").or(defaults.connectors.notion_url),
                sharepoint_url: env_opt("WORKGATE_SHAREPOINT_URL")
                    .or(defaults.connectors.sharepoint_url),
            },
            limits: LimitsConfig {
                max_sources: env_number("WORKGATE_MAX_SOURCES", defaults.limits.max_sources),
                max_results_ceiling: env_number(
                    "WORKGATE_MAX_RESULTS",
                    defaults.limits.max_results_ceiling,
                ),
                max_query_chars: env_number(
                    "WORKGATE_MAX_QUERY_CHARS",
                    defaults.limits.max_query_chars,
                ),
                connector_timeout: env_millis(
                    "WORKGATE_CONNECTOR_TIMEOUT_MS",
                    defaults.limits.connector_timeout,
                ),
                request_deadline: env_millis(
                    "WORKGATE_REQUEST_DEADLINE_MS",
                    defaults.limits.request_deadline,
                ),
            },
            telemetry: TelemetryConfig {
                gateway_url: env_opt("WORKGATE_TELEMETRY_URL"),
                api_key: env_string("WORKGATE_TELEMETRY_API_KEY", String::new()),
            },
        }
    }
}

fn env_string(key: &str, default: String) -> String {
    std::env::var(key).unwrap_or(default)
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

fn env_number<T: std::str::FromStr + Copy>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => match raw.parse() {
            Ok(v) => v,
            Err(_) => {
                tracing::warn!("Ignoring unparseable {}={:?}, using default", key, raw);
                default
            }
        },
        Err(_) => default,
    }
}

fn env_millis(key: &str, default: Duration) -> Duration {
    Duration::from_millis(env_number(key, default.as_millis() as u64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_bounds() {
        let limits = LimitsConfig::default();
        assert_eq!(limits.max_sources, 5);
        assert_eq!(limits.max_results_ceiling, 50);
        assert_eq!(limits.max_query_chars, 500);
    }

    #[test]
    fn test_default_connectors() {
        let connectors = ConnectorsConfig::default();
        assert!(connectors.google_drive_url.is_some());
        assert!(connectors.notion_url.is_some());
        assert!(connectors.sharepoint_url.is_none());
    }

    #[test]
    fn test_telemetry_disabled_by_default() {
        assert!(TelemetryConfig::default().gateway_url.is_none());
    }
}
