//! Home Assistant REST client.
//!
//! [`HubClient`] is the only component that touches the network. The tool
//! registry talks to it through the [`HubApi`] trait so the registry can be
//! exercised against an in-memory hub.

pub mod decode;
pub mod executor;
pub mod types;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::Result;

pub use decode::{decode_body, DecodedBody};
pub use executor::HubClient;
pub use types::{EntityState, ServiceDomain, ServiceInvocation};

/// Typed view of the hub endpoints the bridge uses.
///
/// All paths and query parameters are percent-encoded by the implementation;
/// callers pass raw values. Implementations must be safe to share across
/// concurrent invocations.
#[async_trait]
pub trait HubApi: Send + Sync {
    /// `GET /api/`. `Ok(true)` when the hub answers with a 2xx.
    async fn check_connection(&self) -> Result<bool>;

    /// `GET /api/config`
    async fn get_config(&self) -> Result<Value>;

    /// `GET /api/states`
    async fn get_states(&self) -> Result<Vec<EntityState>>;

    /// `GET /api/states/{entity_id}`
    async fn get_state(&self, entity_id: &str) -> Result<Value>;

    /// `GET /api/services`
    async fn get_services(&self) -> Result<Vec<ServiceDomain>>;

    /// `POST /api/services/{domain}/{service}`
    async fn call_service(&self, invocation: ServiceInvocation) -> Result<Value>;

    /// `GET /api/history/period/{start}?filter_entity_id=..&end_time=..`
    async fn get_history(
        &self,
        start: &str,
        entity_id: Option<&str>,
        end: Option<&str>,
    ) -> Result<Value>;

    /// `GET /api/logbook/{start}?entity=..&end_time=..`
    async fn get_logbook(
        &self,
        start: &str,
        entity_id: Option<&str>,
        end: Option<&str>,
    ) -> Result<Value>;

    /// `POST /api/template` with `{template, ...variables}`.
    async fn render_template(&self, template: &str, variables: Map<String, Value>)
        -> Result<Value>;

    /// `POST /api/events/{event_type}`
    async fn fire_event(&self, event_type: &str, data: Map<String, Value>) -> Result<Value>;
}
