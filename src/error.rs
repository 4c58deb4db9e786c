//! Error taxonomy for the bridge.
//!
//! Every failure the bridge can surface is a `BridgeError`. Guard and
//! validation failures are produced before any network call; transport and
//! timeout failures come from the request executor. Nothing here is retried.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, BridgeError>;

/// All errors produced by the bridge.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Invalid policy configuration at startup. Fatal.
    #[error("{0}")]
    Configuration(String),

    /// Write-gate or allow-list rejection.
    #[error("{0}")]
    Authorization(String),

    /// Malformed or out-of-range operation input.
    #[error("{0}")]
    Validation(String),

    /// The hub answered with a non-2xx status.
    #[error("Home Assistant HTTP {status_code}: {body}")]
    Transport { status_code: u16, body: String },

    /// No response arrived within the configured bound.
    #[error("Home Assistant request timed out after {timeout_ms}ms: {method} {path}")]
    Timeout {
        method: String,
        path: String,
        timeout_ms: u64,
    },

    /// The requested operation name is not in the catalogue.
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// A 2xx body that does not have the shape a typed helper expects.
    #[error("Unexpected Home Assistant response: {0}")]
    Decode(String),

    /// Network failure other than a timeout (DNS, refused connection, ...).
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl BridgeError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn authorization(message: impl Into<String>) -> Self {
        Self::Authorization(message.into())
    }

    /// Stable snake_case tag for the error category.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration",
            Self::Authorization(_) => "authorization",
            Self::Validation(_) => "validation",
            Self::Transport { .. } => "transport",
            Self::Timeout { .. } => "timeout",
            Self::UnknownTool(_) => "unknown_tool",
            Self::Decode(_) => "decode",
            Self::Http(_) => "network",
        }
    }

    /// HTTP status code returned by the hub, if this is a transport failure.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Transport { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_display_carries_status_and_body() {
        let err = BridgeError::Transport {
            status_code: 404,
            body: "Entity not found".to_string(),
        };
        assert_eq!(err.to_string(), "Home Assistant HTTP 404: Entity not found");
        assert_eq!(err.status_code(), Some(404));
        assert_eq!(err.kind(), "transport");
    }

    #[test]
    fn test_timeout_display_names_method_and_path() {
        let err = BridgeError::Timeout {
            method: "GET".to_string(),
            path: "/api/states".to_string(),
            timeout_ms: 50,
        };
        let msg = err.to_string();
        assert!(msg.contains("timed out"));
        assert!(msg.contains("50ms"));
        assert!(msg.contains("GET /api/states"));
        assert!(err.is_timeout());
        assert_eq!(err.status_code(), None);
    }

    #[test]
    fn test_policy_errors_render_verbatim() {
        let err = BridgeError::authorization("Tool ha_light_on is blocked because readOnly=true");
        assert_eq!(err.to_string(), "Tool ha_light_on is blocked because readOnly=true");
        assert_eq!(err.kind(), "authorization");

        let err = BridgeError::validation("position must be between 0 and 100");
        assert_eq!(err.kind(), "validation");
    }
}
