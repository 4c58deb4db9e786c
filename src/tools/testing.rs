//! In-memory hub that records every call.

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use crate::client::{EntityState, HubApi, ServiceDomain, ServiceInvocation};
use crate::error::{BridgeError, Result};

#[derive(Debug, Clone, Copy)]
pub enum FakeFailure {
    Transport(u16, &'static str),
    Timeout,
}

/// One recorded hub call: endpoint name plus its arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct HubCall {
    pub endpoint: &'static str,
    pub args: Value,
}

#[derive(Default)]
pub struct FakeHub {
    pub states: Vec<EntityState>,
    pub services: Vec<ServiceDomain>,
    pub history: Option<Value>,
    pub logbook: Option<Value>,
    pub failure: Option<FakeFailure>,
    calls: Mutex<Vec<HubCall>>,
}

pub fn state(entity_id: &str, state: &str, attributes: Value) -> EntityState {
    serde_json::from_value(json!({
        "entity_id": entity_id,
        "state": state,
        "attributes": attributes,
        "last_changed": "2026-02-26T10:00:00+00:00"
    }))
    .unwrap()
}

pub fn service_domain(domain: &str) -> ServiceDomain {
    serde_json::from_value(json!({"domain": domain, "services": {"turn_on": {}}})).unwrap()
}

impl FakeHub {
    pub fn with_states(states: Vec<EntityState>) -> Self {
        Self {
            states,
            ..Self::default()
        }
    }

    pub fn failing(failure: FakeFailure) -> Self {
        Self {
            failure: Some(failure),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<HubCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn last_call(&self) -> HubCall {
        self.calls().pop().expect("no hub calls recorded")
    }

    fn record(&self, endpoint: &'static str, args: Value) -> Result<()> {
        self.calls.lock().unwrap().push(HubCall { endpoint, args });
        match self.failure {
            None => Ok(()),
            Some(FakeFailure::Transport(status_code, body)) => Err(BridgeError::Transport {
                status_code,
                body: body.to_string(),
            }),
            Some(FakeFailure::Timeout) => Err(BridgeError::Timeout {
                method: "GET".to_string(),
                path: endpoint.to_string(),
                timeout_ms: 1,
            }),
        }
    }
}

#[async_trait]
impl HubApi for FakeHub {
    async fn check_connection(&self) -> Result<bool> {
        self.record("check_connection", Value::Null)?;
        Ok(true)
    }

    async fn get_config(&self) -> Result<Value> {
        self.record("get_config", Value::Null)?;
        Ok(json!({"version": "2026.2.0", "location_name": "Home"}))
    }

    async fn get_states(&self) -> Result<Vec<EntityState>> {
        self.record("get_states", Value::Null)?;
        Ok(self.states.clone())
    }

    async fn get_state(&self, entity_id: &str) -> Result<Value> {
        self.record("get_state", json!({"entity_id": entity_id}))?;
        Ok(json!({"entity_id": entity_id, "state": "on"}))
    }

    async fn get_services(&self) -> Result<Vec<ServiceDomain>> {
        self.record("get_services", Value::Null)?;
        Ok(self.services.clone())
    }

    async fn call_service(&self, invocation: ServiceInvocation) -> Result<Value> {
        self.record(
            "call_service",
            json!({
                "domain": invocation.domain,
                "service": invocation.service,
                "payload": invocation.payload,
            }),
        )?;
        Ok(json!([]))
    }

    async fn get_history(
        &self,
        start: &str,
        entity_id: Option<&str>,
        end: Option<&str>,
    ) -> Result<Value> {
        self.record("get_history", json!({"start": start, "entity_id": entity_id, "end": end}))?;
        Ok(self.history.clone().unwrap_or_else(|| json!([])))
    }

    async fn get_logbook(
        &self,
        start: &str,
        entity_id: Option<&str>,
        end: Option<&str>,
    ) -> Result<Value> {
        self.record("get_logbook", json!({"start": start, "entity_id": entity_id, "end": end}))?;
        Ok(self.logbook.clone().unwrap_or_else(|| json!([])))
    }

    async fn render_template(
        &self,
        template: &str,
        variables: Map<String, Value>,
    ) -> Result<Value> {
        self.record("render_template", json!({"template": template, "variables": variables}))?;
        Ok(Value::String("rendered".to_string()))
    }

    async fn fire_event(&self, event_type: &str, data: Map<String, Value>) -> Result<Value> {
        self.record("fire_event", json!({"event_type": event_type, "data": data}))?;
        Ok(json!({"message": format!("Event {} fired.", event_type)}))
    }
}
