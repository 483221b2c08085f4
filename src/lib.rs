//! # Workgate - Scope-Gated Workplace Search Gateway
//!
//! An MCP-style HTTP server that gates tool invocations on OAuth permission
//! scopes before fanning them out to workplace source connectors:
//! - Bearer credential verification via an external verifier service
//! - Conjunctive, fail-closed scope authorization (`workplace:read:<source>`)
//! - Concurrent per-source fan-out with timeouts and cancellation
//! - Order-preserving result aggregation with per-source failure isolation
//! - Connector health tracking surfaced on the health endpoint
//!
//! ## Architecture
//!
//! The dispatcher owns validation and the authorization decision; identity
//! and observability are injected collaborators behind narrow traits:
//! ```text
//!   HTTP request → ┌──────────────────────────────────┐
//!                  │        Scope-Gated Dispatcher    │
//!                  │  validate → authorize → fan out  │
//!                  └───┬──────────┬───────────┬───────┘
//!                      │          │           │
//!               verifier svc   connectors  telemetry
//!               (scopes oracle) (per-source) (gateway)
//! ```

// Enforce strict safety at compile time
#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]
#![warn(rust_2018_idioms)]

// Re-export public API
pub mod auth;
pub mod connectors;
pub mod dispatch;
pub mod http;
pub mod telemetry;
pub mod tools;
pub mod types;

// Internal utilities
pub mod observability;

pub use types::{Config, Error, Result};
