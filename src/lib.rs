//! # ha-bridge
//!
//! Policy-enforced bridge between agent tool calls and the Home Assistant
//! REST API.
//!
//! A caller names an operation (`ha_light_on`, `ha_history`, ...) and passes a
//! JSON input object. The [`tools::ToolRegistry`] applies the write gate and
//! the domain allow-list from [`config::PolicyConfig`], validates the input,
//! and issues at most one authenticated request through
//! [`client::HubClient`]. Rejected calls never reach the network.

pub mod client;
pub mod config;
pub mod error;
pub mod guards;
pub mod server;
pub mod tools;

pub use client::{HubApi, HubClient};
pub use config::{validate_config, PolicyConfig};
pub use error::{BridgeError, Result};
pub use guards::EntityRef;
pub use tools::{ToolRegistry, ToolSpec};

/// Crate version reported by `/health`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
