//! Raw config sources: JSON/YAML files and environment variables.
//!
//! Both loaders only assemble the raw object; normalization and validation
//! always go through [`validate_config`](super::validate_config).

use std::path::Path;

use serde_json::{Map, Value};

use super::{validate_config, PolicyConfig};
use crate::error::{BridgeError, Result};

/// Load and validate a config file. `.yaml`/`.yml` files are parsed as YAML,
/// everything else as JSON.
pub fn load_config_file(path: impl AsRef<Path>) -> Result<PolicyConfig> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| {
        BridgeError::Configuration(format!("Failed to read config {}: {}", path.display(), e))
    })?;

    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    let raw: Value = if is_yaml {
        serde_yaml::from_str(&text).map_err(|e| {
            BridgeError::Configuration(format!("Invalid YAML in {}: {}", path.display(), e))
        })?
    } else {
        serde_json::from_str(&text).map_err(|e| {
            BridgeError::Configuration(format!("Invalid JSON in {}: {}", path.display(), e))
        })?
    };

    log::debug!("Loaded raw config from {}", path.display());
    validate_config(&raw)
}

/// Build and validate a config from `HA_*` environment variables.
///
/// - `HA_URL`, `HA_TOKEN` (required)
/// - `HA_ALLOWED_DOMAINS` comma-separated list
/// - `HA_READ_ONLY` `true`/`false`/`1`/`0`
/// - `HA_TIMEOUT_MS`, `HA_HISTORY_WINDOW_HOURS`
pub fn config_from_env() -> Result<PolicyConfig> {
    config_from_vars(|key| std::env::var(key).ok())
}

pub(crate) fn config_from_vars<F>(lookup: F) -> Result<PolicyConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut raw = Map::new();

    if let Some(url) = lookup("HA_URL") {
        raw.insert("url".to_string(), Value::String(url));
    }
    if let Some(token) = lookup("HA_TOKEN") {
        raw.insert("token".to_string(), Value::String(token));
    }
    if let Some(domains) = lookup("HA_ALLOWED_DOMAINS") {
        let list: Vec<Value> = domains
            .split(',')
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(|d| Value::String(d.to_string()))
            .collect();
        raw.insert("allowedDomains".to_string(), Value::Array(list));
    }
    if let Some(flag) = lookup("HA_READ_ONLY") {
        raw.insert("readOnly".to_string(), parse_flag(&flag));
    }
    for (var, field) in [
        ("HA_TIMEOUT_MS", "timeoutMs"),
        ("HA_HISTORY_WINDOW_HOURS", "historyWindowHours"),
    ] {
        if let Some(value) = lookup(var) {
            let parsed = value
                .trim()
                .parse::<u64>()
                .map(Value::from)
                .unwrap_or(Value::String(value));
            raw.insert(field.to_string(), parsed);
        }
    }

    validate_config(&Value::Object(raw))
}

/// Unrecognized flag text is passed through as a string so validation
/// reports it instead of silently defaulting.
fn parse_flag(value: &str) -> Value {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Value::Bool(true),
        "false" | "0" | "no" | "" => Value::Bool(false),
        _ => Value::String(value.to_string()),
    }
}
