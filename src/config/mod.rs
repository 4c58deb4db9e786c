//! Policy configuration.
//!
//! Raw configuration (from a file, the environment, or the hosting framework)
//! is normalized once by [`validate_config`] into an immutable
//! [`PolicyConfig`]. The guard and registry layers only ever see the
//! validated record.
//!
//! ```json
//! {
//!   "url": "http://homeassistant.local:8123/",
//!   "token": "<long-lived access token>",
//!   "allowedDomains": ["light", "sensor"],
//!   "readOnly": false
//! }
//! ```

pub mod loader;

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use crate::error::{BridgeError, Result};

pub use loader::{config_from_env, load_config_file};

/// Default request timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Default look-back window for history and logbook lookups.
pub const DEFAULT_HISTORY_WINDOW_HOURS: u64 = 24;

/// Well-known Home Assistant domains. Reference only, not enforced.
pub const KNOWN_HA_DOMAINS: &[&str] = &[
    "alarm_control_panel", "automation", "binary_sensor", "button",
    "calendar", "camera", "climate", "cover", "device_tracker",
    "fan", "group", "humidifier", "input_boolean", "input_button",
    "input_datetime", "input_number", "input_select", "input_text",
    "light", "lock", "media_player", "notify", "number", "person",
    "remote", "scene", "script", "select", "sensor", "siren",
    "switch", "timer", "update", "vacuum", "water_heater", "weather", "zone",
];

static HTTP_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^https?://.+").expect("static regex"));

/// Validated, read-only policy record.
#[derive(Clone, PartialEq, Eq)]
pub struct PolicyConfig {
    /// Hub base URL, trimmed, without trailing slashes.
    pub url: String,
    /// Long-lived bearer token.
    pub token: String,
    /// Lowercase domain allow-list. Empty means unrestricted.
    pub allowed_domains: Vec<String>,
    /// Write gate: blocks every write-tagged tool when set.
    pub read_only: bool,
    /// Wall-clock bound for a single hub request.
    pub timeout_ms: u64,
    /// Default history/logbook window when the caller omits a start.
    pub history_window_hours: u64,
}

impl fmt::Debug for PolicyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolicyConfig")
            .field("url", &self.url)
            .field("token", &"<redacted>")
            .field("allowed_domains", &self.allowed_domains)
            .field("read_only", &self.read_only)
            .field("timeout_ms", &self.timeout_ms)
            .field("history_window_hours", &self.history_window_hours)
            .finish()
    }
}

impl PolicyConfig {
    /// Build an unrestricted, writable config. The URL gets the same trailing
    /// slash normalization as [`validate_config`].
    pub fn new(url: impl Into<String>, token: impl Into<String>) -> Self {
        let url: String = url.into();
        Self {
            url: url.trim().trim_end_matches('/').to_string(),
            token: token.into().trim().to_string(),
            allowed_domains: Vec::new(),
            read_only: false,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            history_window_hours: DEFAULT_HISTORY_WINDOW_HOURS,
        }
    }

    /// Builder: set the domain allow-list (normalized to lowercase).
    pub fn with_allowed_domains<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.allowed_domains = normalize_domains(domains);
        self
    }

    /// Builder: set the write gate.
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Builder: set the request timeout.
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Builder: set the default history window.
    pub fn with_history_window_hours(mut self, hours: u64) -> Self {
        self.history_window_hours = hours;
        self
    }

    /// Whether the allow-list restricts anything.
    pub fn has_domain_restrictions(&self) -> bool {
        !self.allowed_domains.is_empty()
    }

    /// Case-insensitive allow-list membership. Always true when unrestricted.
    pub fn allows_domain(&self, domain: &str) -> bool {
        if self.allowed_domains.is_empty() {
            return true;
        }
        let domain = domain.to_lowercase();
        self.allowed_domains.iter().any(|d| *d == domain)
    }
}

fn normalize_domains<I, S>(domains: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for domain in domains {
        let domain = domain.as_ref().trim().to_lowercase();
        if !domain.is_empty() && !out.contains(&domain) {
            out.push(domain);
        }
    }
    out
}

/// A single field problem found during validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFieldError {
    pub field: String,
    pub message: String,
}

impl ConfigFieldError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Validate and normalize a raw config object.
///
/// All field problems are collected and reported together in one
/// `BridgeError::Configuration`.
pub fn validate_config(raw: &Value) -> Result<PolicyConfig> {
    let obj = match raw.as_object() {
        Some(obj) => obj,
        None => {
            return Err(BridgeError::Configuration(
                "Config must be a non-null object".to_string(),
            ))
        }
    };

    let mut errors = Vec::new();
    let url = validate_url(obj, &mut errors);
    let token = validate_token(obj, &mut errors);
    let allowed_domains = validate_allowed_domains(obj, &mut errors);
    let read_only = validate_read_only(obj, &mut errors);
    let timeout_ms = validate_positive_int(obj, "timeoutMs", DEFAULT_TIMEOUT_MS, &mut errors);
    let history_window_hours = validate_positive_int(
        obj,
        "historyWindowHours",
        DEFAULT_HISTORY_WINDOW_HOURS,
        &mut errors,
    );

    match (url, token) {
        (Some(url), Some(token)) if errors.is_empty() => Ok(PolicyConfig {
            url,
            token,
            allowed_domains,
            read_only,
            timeout_ms,
            history_window_hours,
        }),
        _ => {
            let details: Vec<String> = errors
                .iter()
                .map(|e| format!("  - {}: {}", e.field, e.message))
                .collect();
            Err(BridgeError::Configuration(format!(
                "Invalid plugin config:\n{}",
                details.join("\n")
            )))
        }
    }
}

fn is_missing(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        _ => false,
    }
}

fn validate_url(obj: &Map<String, Value>, errors: &mut Vec<ConfigFieldError>) -> Option<String> {
    let value = obj.get("url");
    if is_missing(value) {
        errors.push(ConfigFieldError::new("url", "required"));
        return None;
    }
    let Some(raw) = value.and_then(Value::as_str) else {
        errors.push(ConfigFieldError::new("url", "must be a string"));
        return None;
    };
    let trimmed = raw.trim().trim_end_matches('/');
    if !HTTP_URL_RE.is_match(trimmed) {
        errors.push(ConfigFieldError::new("url", "must be an http:// or https:// URL"));
        return None;
    }
    Some(trimmed.to_string())
}

fn validate_token(obj: &Map<String, Value>, errors: &mut Vec<ConfigFieldError>) -> Option<String> {
    let value = obj.get("token");
    if is_missing(value) {
        errors.push(ConfigFieldError::new("token", "required"));
        return None;
    }
    let Some(raw) = value.and_then(Value::as_str) else {
        errors.push(ConfigFieldError::new("token", "must be a string"));
        return None;
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        errors.push(ConfigFieldError::new("token", "must be non-empty"));
        return None;
    }
    Some(trimmed.to_string())
}

fn validate_allowed_domains(
    obj: &Map<String, Value>,
    errors: &mut Vec<ConfigFieldError>,
) -> Vec<String> {
    let items = match obj.get("allowedDomains") {
        None | Some(Value::Null) => return Vec::new(),
        Some(Value::Array(items)) => items,
        Some(_) => {
            errors.push(ConfigFieldError::new(
                "allowedDomains",
                "must be an array of strings",
            ));
            return Vec::new();
        }
    };

    let mut valid = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        match item.as_str().map(str::trim) {
            Some(s) if !s.is_empty() => valid.push(s.to_string()),
            _ => errors.push(ConfigFieldError::new(
                format!("allowedDomains[{}]", i),
                "must be a non-empty string",
            )),
        }
    }
    normalize_domains(valid)
}

fn validate_read_only(obj: &Map<String, Value>, errors: &mut Vec<ConfigFieldError>) -> bool {
    match obj.get("readOnly") {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(_) => {
            errors.push(ConfigFieldError::new("readOnly", "must be a boolean"));
            false
        }
    }
}

fn validate_positive_int(
    obj: &Map<String, Value>,
    field: &str,
    default: u64,
    errors: &mut Vec<ConfigFieldError>,
) -> u64 {
    match obj.get(field) {
        None | Some(Value::Null) => default,
        Some(value) => match value.as_u64() {
            Some(n) if n > 0 => n,
            _ => {
                errors.push(ConfigFieldError::new(field, "must be a positive integer"));
                default
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config_error(raw: Value) -> String {
        validate_config(&raw).unwrap_err().to_string()
    }

    #[test]
    fn test_minimal_config_round_trip() {
        let config = validate_config(&json!({"url": "http://h:8123/", "token": "t"})).unwrap();
        assert_eq!(config.url, "http://h:8123");
        assert_eq!(config.token, "t");
        assert!(config.allowed_domains.is_empty());
        assert!(!config.read_only);
        assert_eq!(config.timeout_ms, DEFAULT_TIMEOUT_MS);
        assert_eq!(config.history_window_hours, 24);
    }

    #[test]
    fn test_normalizes_whitespace_slashes_and_case() {
        let config = validate_config(&json!({
            "url": "  https://ha.example.com:8123///  ",
            "token": "  abc  ",
            "allowedDomains": [" Light ", "SENSOR", "light"],
            "readOnly": true,
        }))
        .unwrap();
        assert_eq!(config.url, "https://ha.example.com:8123");
        assert_eq!(config.token, "abc");
        assert_eq!(config.allowed_domains, vec!["light", "sensor"]);
        assert!(config.read_only);
    }

    #[test]
    fn test_rejects_non_object() {
        assert_eq!(config_error(Value::Null), "Config must be a non-null object");
        assert_eq!(config_error(json!("x")), "Config must be a non-null object");
    }

    #[test]
    fn test_missing_url_and_token_reported_together() {
        let msg = config_error(json!({}));
        assert!(msg.starts_with("Invalid plugin config:"));
        assert!(msg.contains("  - url: required"));
        assert!(msg.contains("  - token: required"));
    }

    #[test]
    fn test_rejects_non_http_url() {
        let msg = config_error(json!({"url": "ftp://h", "token": "t"}));
        assert!(msg.contains("url: must be an http:// or https:// URL"));
        let msg = config_error(json!({"url": 42, "token": "t"}));
        assert!(msg.contains("url: must be a string"));
    }

    #[test]
    fn test_rejects_blank_token() {
        let msg = config_error(json!({"url": "http://h", "token": "   "}));
        assert!(msg.contains("token: must be non-empty"));
    }

    #[test]
    fn test_rejects_bad_allowed_domains() {
        let msg = config_error(json!({"url": "http://h", "token": "t", "allowedDomains": "light"}));
        assert!(msg.contains("allowedDomains: must be an array of strings"));

        let msg = config_error(json!({"url": "http://h", "token": "t", "allowedDomains": ["light", "", 3]}));
        assert!(msg.contains("allowedDomains[1]: must be a non-empty string"));
        assert!(msg.contains("allowedDomains[2]: must be a non-empty string"));
    }

    #[test]
    fn test_rejects_non_boolean_read_only() {
        let msg = config_error(json!({"url": "http://h", "token": "t", "readOnly": "yes"}));
        assert!(msg.contains("readOnly: must be a boolean"));
    }

    #[test]
    fn test_optional_numeric_fields() {
        let config = validate_config(&json!({
            "url": "http://h", "token": "t", "timeoutMs": 500, "historyWindowHours": 6
        }))
        .unwrap();
        assert_eq!(config.timeout_ms, 500);
        assert_eq!(config.history_window_hours, 6);

        let msg = config_error(json!({"url": "http://h", "token": "t", "timeoutMs": 0}));
        assert!(msg.contains("timeoutMs: must be a positive integer"));
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = PolicyConfig::new("http://h", "super-secret");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_allows_domain() {
        let open = PolicyConfig::new("http://h", "t");
        assert!(open.allows_domain("anything"));

        let restricted = PolicyConfig::new("http://h", "t").with_allowed_domains(["Light"]);
        assert!(restricted.allows_domain("LIGHT"));
        assert!(!restricted.allows_domain("switch"));
    }
}
