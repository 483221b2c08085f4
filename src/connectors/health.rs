//! Connector health tracking.
//!
//! In-memory sliding-window health metrics per connector, recorded by the
//! dispatcher after each fan-out and reported by the health endpoint.
//! Advisory only: an unhealthy connector is still invoked when authorized —
//! skipping it would silently narrow the caller's request.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

// =============================================================================
// Configuration
// =============================================================================

/// Health assessment thresholds (configurable, not hardcoded).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthConfig {
    /// Minimum success rate for HEALTHY status (default: 0.95).
    pub success_rate_healthy: f64,
    /// Minimum success rate for DEGRADED status (default: 0.80).
    pub success_rate_degraded: f64,
    /// Maximum avg latency (ms) for HEALTHY status (default: 2000).
    pub latency_healthy_ms: u64,
    /// Maximum avg latency (ms) for DEGRADED status (default: 5000).
    pub latency_degraded_ms: u64,
    /// Minimum calls before health assessment (default: 5).
    pub min_calls_for_assessment: usize,
    /// Sliding window size for health metrics (default: 100).
    pub window_size: usize,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            success_rate_healthy: 0.95,
            success_rate_degraded: 0.80,
            latency_healthy_ms: 2000,
            latency_degraded_ms: 5000,
            min_calls_for_assessment: 5,
            window_size: 100,
        }
    }
}

// =============================================================================
// Status
// =============================================================================

/// Health status of a connector or of the whole fan-out surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
    Unknown,
}

fn worse_status(a: HealthStatus, b: HealthStatus) -> HealthStatus {
    fn rank(s: HealthStatus) -> u8 {
        match s {
            HealthStatus::Healthy => 0,
            HealthStatus::Unknown => 1,
            HealthStatus::Degraded => 2,
            HealthStatus::Unhealthy => 3,
        }
    }
    if rank(a) >= rank(b) {
        a
    } else {
        b
    }
}

// =============================================================================
// Per-connector metrics
// =============================================================================

/// Single connector call record (in-memory, sliding window).
#[derive(Debug, Clone)]
struct ExecutionRecord {
    success: bool,
    latency_ms: u64,
}

/// Sliding window metrics for a single connector.
#[derive(Debug)]
struct ConnectorMetrics {
    records: VecDeque<ExecutionRecord>,
    window_size: usize,
}

impl ConnectorMetrics {
    fn new(window_size: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(window_size),
            window_size,
        }
    }

    fn record(&mut self, success: bool, latency_ms: u64) {
        if self.records.len() >= self.window_size {
            self.records.pop_front();
        }
        self.records.push_back(ExecutionRecord { success, latency_ms });
    }

    fn total_calls(&self) -> usize {
        self.records.len()
    }

    fn success_count(&self) -> usize {
        self.records.iter().filter(|r| r.success).count()
    }

    fn error_count(&self) -> usize {
        self.records.iter().filter(|r| !r.success).count()
    }

    fn success_rate(&self) -> f64 {
        let total = self.total_calls();
        if total == 0 {
            return 0.0;
        }
        self.success_count() as f64 / total as f64
    }

    fn avg_latency_ms(&self) -> f64 {
        let total = self.total_calls();
        if total == 0 {
            return 0.0;
        }
        let sum: u64 = self.records.iter().map(|r| r.latency_ms).sum();
        sum as f64 / total as f64
    }
}

// =============================================================================
// Health reports
// =============================================================================

/// Health report for a single connector.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectorHealthReport {
    pub connector: String,
    pub status: HealthStatus,
    pub success_rate: f64,
    pub avg_latency_ms: f64,
    pub total_calls: usize,
    pub recent_errors: usize,
    pub issues: Vec<String>,
}

/// Health report across all connectors.
#[derive(Debug, Clone, Serialize)]
pub struct SystemHealthReport {
    pub status: HealthStatus,
    pub connectors: Vec<ConnectorHealthReport>,
    pub summary: HealthSummary,
}

/// Counts by health status.
#[derive(Debug, Clone, Serialize)]
pub struct HealthSummary {
    pub healthy: usize,
    pub degraded: usize,
    pub unhealthy: usize,
    pub unknown: usize,
}

// =============================================================================
// Health tracker
// =============================================================================

/// In-memory connector health tracker with sliding-window metrics.
#[derive(Debug)]
pub struct ConnectorHealthTracker {
    config: HealthConfig,
    metrics: HashMap<String, ConnectorMetrics>,
    /// Connectors that were registered but may not have been called yet.
    registered: Vec<String>,
}

impl ConnectorHealthTracker {
    pub fn new(config: HealthConfig) -> Self {
        Self {
            config,
            metrics: HashMap::new(),
            registered: Vec::new(),
        }
    }

    /// Register connector names so the report covers idle connectors too.
    pub fn set_registered_connectors(&mut self, names: Vec<String>) {
        self.registered = names;
    }

    /// Record a connector call outcome.
    pub fn record_execution(&mut self, connector: &str, success: bool, latency_ms: u64) {
        let metrics = self
            .metrics
            .entry(connector.to_string())
            .or_insert_with(|| ConnectorMetrics::new(self.config.window_size));
        metrics.record(success, latency_ms);
    }

    /// Check health of a single connector.
    pub fn check_connector_health(&self, connector: &str) -> ConnectorHealthReport {
        let Some(m) = self.metrics.get(connector) else {
            return ConnectorHealthReport {
                connector: connector.to_string(),
                status: HealthStatus::Unknown,
                success_rate: 0.0,
                avg_latency_ms: 0.0,
                total_calls: 0,
                recent_errors: 0,
                issues: vec!["No call history".to_string()],
            };
        };

        let total = m.total_calls();
        if total < self.config.min_calls_for_assessment {
            return ConnectorHealthReport {
                connector: connector.to_string(),
                status: HealthStatus::Unknown,
                success_rate: m.success_rate(),
                avg_latency_ms: m.avg_latency_ms(),
                total_calls: total,
                recent_errors: m.error_count(),
                issues: vec![format!(
                    "Insufficient data ({}/{})",
                    total, self.config.min_calls_for_assessment
                )],
            };
        }

        let success_rate = m.success_rate();
        let avg_latency = m.avg_latency_ms();

        // Worst-of-two: success rate status vs latency status
        let rate_status = if success_rate >= self.config.success_rate_healthy {
            HealthStatus::Healthy
        } else if success_rate >= self.config.success_rate_degraded {
            HealthStatus::Degraded
        } else {
            HealthStatus::Unhealthy
        };

        let latency_status = if avg_latency <= self.config.latency_healthy_ms as f64 {
            HealthStatus::Healthy
        } else if avg_latency <= self.config.latency_degraded_ms as f64 {
            HealthStatus::Degraded
        } else {
            HealthStatus::Unhealthy
        };

        let status = worse_status(rate_status, latency_status);

        let mut issues = Vec::new();
        if success_rate < self.config.success_rate_healthy {
            issues.push(format!(
                "Success rate {:.1}% below {:.0}% threshold",
                success_rate * 100.0,
                self.config.success_rate_healthy * 100.0,
            ));
        }
        if avg_latency > self.config.latency_healthy_ms as f64 {
            issues.push(format!(
                "Avg latency {:.0}ms exceeds {}ms threshold",
                avg_latency, self.config.latency_healthy_ms,
            ));
        }

        ConnectorHealthReport {
            connector: connector.to_string(),
            status,
            success_rate,
            avg_latency_ms: avg_latency,
            total_calls: total,
            recent_errors: m.error_count(),
            issues,
        }
    }

    /// Check health of all connectors (registered + called).
    pub fn check_system_health(&self) -> SystemHealthReport {
        let mut all: Vec<String> = self.registered.clone();
        for name in self.metrics.keys() {
            if !all.contains(name) {
                all.push(name.clone());
            }
        }
        all.sort();

        let connectors: Vec<ConnectorHealthReport> = all
            .iter()
            .map(|name| self.check_connector_health(name))
            .collect();

        let mut summary = HealthSummary {
            healthy: 0,
            degraded: 0,
            unhealthy: 0,
            unknown: 0,
        };
        for report in &connectors {
            match report.status {
                HealthStatus::Healthy => summary.healthy += 1,
                HealthStatus::Degraded => summary.degraded += 1,
                HealthStatus::Unhealthy => summary.unhealthy += 1,
                HealthStatus::Unknown => summary.unknown += 1,
            }
        }

        // System status = worst of all connector statuses
        let status = if summary.unhealthy > 0 {
            HealthStatus::Unhealthy
        } else if summary.degraded > 0 {
            HealthStatus::Degraded
        } else if summary.healthy > 0 {
            HealthStatus::Healthy
        } else {
            HealthStatus::Unknown
        };

        SystemHealthReport {
            status,
            connectors,
            summary,
        }
    }
}

impl Default for ConnectorHealthTracker {
    fn default() -> Self {
        Self::new(HealthConfig::default())
    }
}

// =============================================================================
// Tests
// =============================================================================
