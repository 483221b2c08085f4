//! The scope-gated dispatcher core.
//!
//! Order of operations per invocation: bounds validation, connector
//! resolution, conjunctive scope authorization, then concurrent fan-out.
//! Authorization is fail-closed — one missing scope rejects the whole
//! request and no connector is invoked. After authorization the policy
//! flips: each connector failure is isolated, recorded, and surfaced in
//! aggregate metadata instead of failing the response.

use crate::auth::{Claims, Scope};
use crate::connectors::{ConnectorHealthTracker, ConnectorRegistry, SearchQuery, SourceConnector};
use crate::dispatch::request::SearchRequest;
use crate::dispatch::response::{SearchReport, SourceFailure};
use crate::types::{Error, LimitsConfig, Result};
use futures::future::join_all;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tokio_util::sync::CancellationToken;

/// Stateless request dispatcher. Holds no per-request state and no locks
/// beyond the advisory health tracker; concurrent invocations share nothing
/// mutable.
#[derive(Debug)]
pub struct Dispatcher {
    registry: Arc<ConnectorRegistry>,
    health: Arc<Mutex<ConnectorHealthTracker>>,
    limits: LimitsConfig,
}

impl Dispatcher {
    pub fn new(
        registry: Arc<ConnectorRegistry>,
        health: Arc<Mutex<ConnectorHealthTracker>>,
        limits: LimitsConfig,
    ) -> Self {
        Self {
            registry,
            health,
            limits,
        }
    }

    /// Execute one authorized workplace search.
    ///
    /// Returns a validation error for out-of-bound input, an authorization
    /// error naming every missing scope, a cancellation/timeout outcome when
    /// the invocation is abandoned, and otherwise the aggregate report.
    pub async fn invoke(
        &self,
        claims: &Claims,
        request: &SearchRequest,
        cancel: &CancellationToken,
    ) -> Result<SearchReport> {
        // Malformed input cannot be safely evaluated for scope.
        request.validate_bounds(&self.limits)?;
        let connectors = self.resolve_connectors(&request.sources)?;
        authorize(claims, &request.sources)?;

        if cancel.is_cancelled() {
            return Err(Error::cancelled("request cancelled before dispatch"));
        }

        let query = SearchQuery {
            query: request.query.clone(),
            max_results: request.max_results,
            include_content: request.include_content,
        };
        let started = Instant::now();

        let calls = connectors.into_iter().map(|(source, connector)| {
            let query = query.clone();
            let health = Arc::clone(&self.health);
            let per_timeout = self.limits.connector_timeout;
            async move {
                let call_started = Instant::now();
                let outcome = tokio::time::timeout(per_timeout, connector.search(&query)).await;
                let latency_ms = call_started.elapsed().as_millis() as u64;
                match outcome {
                    Ok(Ok(items)) => {
                        record_health(&health, &source, true, latency_ms);
                        (source, Ok(items))
                    }
                    Ok(Err(err)) => {
                        tracing::warn!(source = %source, "Connector failed: {}", err);
                        record_health(&health, &source, false, latency_ms);
                        (source, Err(err.to_string()))
                    }
                    Err(_elapsed) => {
                        tracing::warn!(
                            source = %source,
                            "Connector timed out after {:?}",
                            per_timeout
                        );
                        record_health(&health, &source, false, latency_ms);
                        (source, Err(format!("timed out after {:?}", per_timeout)))
                    }
                }
            }
        });

        // join_all preserves input order — the response ordering guarantee.
        // Dropping the fan-out on cancellation aborts all pending calls.
        let fanout = tokio::time::timeout(self.limits.request_deadline, join_all(calls));
        let outcomes = tokio::select! {
            _ = cancel.cancelled() => {
                return Err(Error::cancelled("request cancelled during dispatch"));
            }
            gathered = fanout => gathered.map_err(|_| {
                Error::timeout(format!(
                    "request deadline of {:?} elapsed",
                    self.limits.request_deadline
                ))
            })?,
        };

        let mut results = Vec::new();
        let mut failures = Vec::new();
        for (source, outcome) in outcomes {
            match outcome {
                Ok(items) => results.extend(items),
                Err(reason) => failures.push(SourceFailure { source, reason }),
            }
        }
        results.truncate(request.max_results as usize);
        let total_count = results.len();

        Ok(SearchReport {
            query: request.query.clone(),
            sources: request.sources.clone(),
            results,
            total_count,
            failures,
            execution_time_ms: started.elapsed().as_millis() as u64,
        })
    }

    /// Resolve every named source to a registered connector. Unknown names
    /// are a validation failure, reported before any scope check.
    fn resolve_connectors(
        &self,
        sources: &[String],
    ) -> Result<Vec<(String, Arc<dyn SourceConnector>)>> {
        sources
            .iter()
            .map(|source| {
                self.registry
                    .get(source)
                    .map(|connector| (source.clone(), connector))
                    .ok_or_else(|| Error::validation(format!("unknown source: {}", source)))
            })
            .collect()
    }
}

/// Conjunctive, fail-closed authorization: every derived scope must be
/// present in the grant. Partial authorization (silently dropping
/// unauthorized sources) is rejected in favor of an explicit denial.
fn authorize(claims: &Claims, sources: &[String]) -> Result<()> {
    let missing: Vec<String> = sources
        .iter()
        .map(|source| Scope::for_source_read(source))
        .filter(|scope| !claims.scopes.contains(scope))
        .map(|scope| scope.to_string())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(Error::Authorization { missing })
    }
}

fn record_health(
    health: &Mutex<ConnectorHealthTracker>,
    connector: &str,
    success: bool,
    latency_ms: u64,
) {
    health
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
        .record_execution(connector, success, latency_ms);
}

// =============================================================================
// Tests
// =============================================================================
