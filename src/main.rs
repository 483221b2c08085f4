//! Workgate server - main entry point.
//!
//! Wires the collaborators together and serves until interrupted:
//! - HttpVerifier: external credential verification
//! - ConnectorRegistry: one HTTP connector per configured source
//! - Dispatcher: validation, authorization, fan-out
//! - TelemetrySink: observability gateway (no-op when unconfigured)

use clap::Parser;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

use workgate::auth::HttpVerifier;
use workgate::connectors::{ConnectorHealthTracker, ConnectorRegistry, HealthConfig};
use workgate::dispatch::Dispatcher;
use workgate::http::{router, AppState, HttpServer};
use workgate::telemetry::{HttpTelemetry, NoopTelemetry, TelemetrySink};
use workgate::tools::default_catalog;
use workgate::Config;

#[derive(Debug, Parser)]
#[command(name = "workgate-server", about = "Scope-gated workplace search gateway")]
struct Args {
    /// HTTP bind address (overrides WORKGATE_LISTEN_ADDR).
    #[arg(long, env = "WORKGATE_LISTEN_ADDR")]
    listen: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Initialize observability
    workgate::observability::init_tracing();

    // Load configuration
    let mut config = Config::from_env();
    if let Some(listen) = args.listen {
        config.server.listen_addr = listen;
    }

    // One outbound client shared by verifier, connectors, and telemetry
    let client = reqwest::Client::new();

    let registry = Arc::new(ConnectorRegistry::from_config(&config.connectors, client.clone())?);
    let mut tracker = ConnectorHealthTracker::new(HealthConfig::default());
    tracker.set_registered_connectors(registry.source_names());
    let health = Arc::new(Mutex::new(tracker));

    let verifier = Arc::new(HttpVerifier::new(&config.auth, client.clone()));
    let telemetry: Arc<dyn TelemetrySink> =
        match HttpTelemetry::from_config(&config.telemetry, client) {
            Some(sink) => Arc::new(sink),
            None => Arc::new(NoopTelemetry),
        };

    let catalog = default_catalog(&registry.source_names(), &config.limits)?;
    let dispatcher = Dispatcher::new(
        Arc::clone(&registry),
        Arc::clone(&health),
        config.limits.clone(),
    );

    let state = Arc::new(AppState {
        catalog,
        dispatcher,
        verifier,
        telemetry,
        health,
        cancel: CancellationToken::new(),
    });
    let app = router(Arc::clone(&state));

    let addr: SocketAddr = config.server.listen_addr.parse()?;
    let server = HttpServer::bind(addr, app).await?;

    tracing::info!("🚀 Workgate server starting on {}", server.local_addr()?);
    tracing::info!("  ✓ Sources: {}", registry.source_names().join(", "));
    tracing::info!("  ✓ Verifier: {}", config.auth.verifier_url);
    tracing::info!(
        "  ✓ Telemetry: {}",
        config.telemetry.gateway_url.as_deref().unwrap_or("disabled")
    );

    // SIGINT cancels in-flight dispatches, then drains the server
    let server_cancel = server.cancel_token();
    let dispatch_cancel = state.cancel.clone();
    tokio::spawn(async move {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for shutdown signal: {}", err);
            return;
        }
        tracing::info!("Received shutdown signal");
        dispatch_cancel.cancel();
        server_cancel.cancel();
    });

    server.serve().await?;
    Ok(())
}
