//! Hub data shapes the bridge needs to look inside.
//!
//! Only fields the registry filters or projects on are typed; everything
//! else is carried through untouched in `extra`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One entry of `GET /api/states`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityState {
    pub entity_id: String,
    pub state: String,
    #[serde(default)]
    pub attributes: Map<String, Value>,
    /// `last_changed`, `last_updated`, `context`, ...
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EntityState {
    /// Lowercased domain prefix of the entity id, if it has one.
    pub fn domain(&self) -> Option<String> {
        self.entity_id
            .split_once('.')
            .map(|(domain, _)| domain.to_lowercase())
            .filter(|d| !d.is_empty())
    }

    /// String attribute lookup.
    pub fn attribute_str(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).and_then(Value::as_str)
    }

    pub fn friendly_name(&self) -> Option<&str> {
        self.attribute_str("friendly_name")
    }
}

/// One entry of `GET /api/services`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceDomain {
    pub domain: String,
    #[serde(default)]
    pub services: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A `{domain, service, payload}` triple handed to the executor as
/// `POST /api/services/{domain}/{service}`.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceInvocation {
    pub domain: String,
    pub service: String,
    pub payload: Map<String, Value>,
}

impl ServiceInvocation {
    pub fn new(domain: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            service: service.into(),
            payload: Map::new(),
        }
    }

    /// Builder: replace the payload.
    pub fn with_payload(mut self, payload: Map<String, Value>) -> Self {
        self.payload = payload;
        self
    }

    /// Builder: set one payload field.
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.payload.insert(key.into(), value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entity_state_preserves_unknown_fields() {
        let raw = json!({
            "entity_id": "light.kitchen",
            "state": "on",
            "attributes": {"friendly_name": "Kitchen Light", "brightness": 255},
            "last_changed": "2026-02-26T10:00:00+00:00",
            "context": {"id": "abc"}
        });
        let state: EntityState = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(state.domain().as_deref(), Some("light"));
        assert_eq!(state.friendly_name(), Some("Kitchen Light"));
        assert_eq!(serde_json::to_value(&state).unwrap(), raw);
    }

    #[test]
    fn test_entity_state_defaults_attributes() {
        let state: EntityState =
            serde_json::from_value(json!({"entity_id": "sensor.x", "state": "1"})).unwrap();
        assert!(state.attributes.is_empty());
        assert_eq!(state.friendly_name(), None);
    }

    #[test]
    fn test_service_invocation_builder() {
        let inv = ServiceInvocation::new("light", "turn_on")
            .with_field("entity_id", json!("light.kitchen"))
            .with_field("brightness", json!(128));
        assert_eq!(inv.payload.len(), 2);
        assert_eq!(inv.payload["brightness"], json!(128));
    }
}
