//! HTTP surface — router, handlers, server loop.

pub mod routes;
pub mod server;

pub use routes::{router, AppState};
pub use server::HttpServer;
