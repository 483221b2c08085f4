//! HTTP handlers — health, server info, tool listing, tool invocation.
//!
//! The invocation path is: bearer extraction → credential verification →
//! telemetry request record → catalog shape validation → dispatch →
//! telemetry response record. Liveness and server info require no
//! authorization.

use crate::auth::{authenticate, Claims, CredentialVerifier};
use crate::connectors::ConnectorHealthTracker;
use crate::dispatch::{Dispatcher, SearchRequest, ToolResponse};
use crate::telemetry::{RequestRecord, ResponseRecord, TelemetrySink};
use crate::tools::{ToolCatalog, WORKPLACE_SEARCH_TOOL};
use crate::types::{Error, RequestId, Result, SERVER_NAME, SERVER_VERSION};
use axum::extract::State;
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;
use tokio_util::sync::CancellationToken;

/// Shared state behind every handler.
#[allow(missing_debug_implementations)]
pub struct AppState {
    pub catalog: ToolCatalog,
    pub dispatcher: Dispatcher,
    pub verifier: Arc<dyn CredentialVerifier>,
    pub telemetry: Arc<dyn TelemetrySink>,
    pub health: Arc<Mutex<ConnectorHealthTracker>>,
    /// Cancelled on shutdown; aborts in-flight dispatches.
    pub cancel: CancellationToken,
}

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/mcp/info", get(info))
        .route("/mcp/tools", get(list_tools))
        .route("/mcp/tools/call", post(call_tool))
        .with_state(state)
}

/// Liveness plus per-connector health summary. No authorization.
async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    let connectors = state
        .health
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .check_system_health();
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "connectors": connectors,
    }))
}

/// Server identity and capabilities. No authorization.
async fn info() -> Json<Value> {
    Json(serde_json::json!({
        "name": SERVER_NAME,
        "version": SERVER_VERSION,
        "description": "Scope-gated workplace search gateway",
        "capabilities": {
            "tools": true,
            "resources": false,
            "prompts": false,
        },
    }))
}

/// One tool in the listing response.
#[derive(Debug, Serialize)]
struct ToolListing {
    name: String,
    description: String,
    #[serde(rename = "inputSchema")]
    input_schema: Value,
}

/// List tools the caller's grant could possibly use. Visibility is by scope
/// category and action; the per-resource authorization decision stays with
/// the dispatcher.
async fn list_tools(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<ToolListing>>> {
    let token = bearer_token(&headers)?;
    let claims = authenticate(state.verifier.as_ref(), token).await?;

    let listings = state
        .catalog
        .list_entries()
        .into_iter()
        .filter(|entry| {
            claims
                .scopes
                .has_grant_for(&entry.scope_category, &entry.scope_action)
        })
        .map(|entry| ToolListing {
            name: entry.name.clone(),
            description: entry.description.clone(),
            input_schema: entry.input_schema(),
        })
        .collect();

    Ok(Json(listings))
}

/// Tool invocation body: `{name, arguments}`.
#[derive(Debug, Deserialize)]
struct ToolCallBody {
    name: String,
    #[serde(default = "empty_arguments")]
    arguments: Value,
}

fn empty_arguments() -> Value {
    Value::Object(serde_json::Map::new())
}

/// Execute a tool call and answer with the MCP response envelope.
async fn call_tool(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<ToolCallBody>,
) -> Result<Json<ToolResponse>> {
    let started = Instant::now();
    let token = bearer_token(&headers)?;
    let claims = authenticate(state.verifier.as_ref(), token).await?;
    let request_id = RequestId::new();

    state
        .telemetry
        .record_request(&RequestRecord {
            request_id: request_id.clone(),
            user: claims.subject.clone(),
            tool: body.name.clone(),
            arguments: body.arguments.clone(),
        })
        .await;

    let outcome = execute_tool(&state, &claims, &body).await;

    state
        .telemetry
        .record_response(&ResponseRecord {
            request_id,
            user: claims.subject.clone(),
            tool: body.name.clone(),
            success: outcome.is_ok(),
            execution_time_ms: started.elapsed().as_millis() as u64,
        })
        .await;

    outcome.map(Json)
}

async fn execute_tool(
    state: &AppState,
    claims: &Claims,
    body: &ToolCallBody,
) -> Result<ToolResponse> {
    if !state.catalog.has_tool(&body.name) {
        return Err(Error::not_found(format!("Tool '{}' not found", body.name)));
    }

    let errors = state.catalog.validate_params(&body.name, &body.arguments)?;
    if !errors.is_empty() {
        return Err(Error::validation(errors.join("; ")));
    }
    let mut arguments = body.arguments.clone();
    state.catalog.fill_defaults(&body.name, &mut arguments)?;

    match body.name.as_str() {
        WORKPLACE_SEARCH_TOOL => {
            let request: SearchRequest = serde_json::from_value(arguments)
                .map_err(|e| Error::validation(format!("invalid arguments: {e}")))?;
            let report = state
                .dispatcher
                .invoke(claims, &request, &state.cancel)
                .await?;
            ToolResponse::from_report(&report)
        }
        _ => Err(Error::not_found(format!("Tool '{}' not found", body.name))),
    }
}

/// Extract the bearer token from the `Authorization` header.
fn bearer_token(headers: &HeaderMap) -> Result<&str> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(|| Error::unauthenticated("missing Authorization header"))?;
    let value = header
        .to_str()
        .map_err(|_| Error::unauthenticated("invalid Authorization header"))?;
    value
        .strip_prefix("Bearer ")
        .ok_or_else(|| Error::unauthenticated("Authorization header must use the Bearer scheme"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::AUTHORIZATION,
            HeaderValue::from_static("Bearer abc123"),
        );
        assert_eq!(bearer_token(&headers).unwrap(), "abc123");
    }

    #[test]
    fn test_bearer_token_missing_header() {
        let headers = HeaderMap::new();
        assert!(matches!(
            bearer_token(&headers),
            Err(Error::Unauthenticated(_))
        ));
    }

    #[test]
    fn test_bearer_token_wrong_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::AUTHORIZATION,
            HeaderValue::from_static("Basic dXNlcjpwYXNz"),
        );
        assert!(matches!(
            bearer_token(&headers),
            Err(Error::Unauthenticated(_))
        ));
    }

    #[test]
    fn test_call_body_defaults_arguments() {
        let body: ToolCallBody =
            serde_json::from_value(serde_json::json!({"name": "workplace_search"})).unwrap();
        assert!(body.arguments.is_object());
    }
}
