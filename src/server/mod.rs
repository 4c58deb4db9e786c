//! HTTP server exposing the tool registry.
//!
//! # Endpoints
//!
//! - `GET  /health`       - Liveness probe
//! - `GET  /tools`        - Operation catalogue
//! - `POST /tools/{name}` - Invoke an operation

pub mod routes;

pub use routes::{app_router, AppState};
