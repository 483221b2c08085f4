//! Core types for the workgate server.
//!
//! This module provides foundational types used throughout the system:
//! - **IDs**: Strongly-typed identifiers (RequestId, UserId)
//! - **Errors**: Application error types with thiserror derives
//! - **Config**: Configuration structures for server, auth, connectors, and limits

mod config;
mod errors;
mod ids;

pub use config::{
    AuthConfig, Config, ConnectorsConfig, LimitsConfig, ServerConfig, TelemetryConfig,
    SERVER_NAME, SERVER_VERSION,
};
pub use errors::{Error, Result};
pub use ids::{RequestId, UserId};
