//! Tool registry: the named operations exposed to callers.
//!
//! Every invocation goes through the same pipeline:
//!
//! 1. catalogue lookup (unknown name → [`BridgeError::UnknownTool`])
//! 2. write gate, driven by the static write table
//! 3. the operation's own input and allow-list checks
//! 4. at most one hub call
//!
//! A rejection in steps 1-3 never reaches the network.

pub mod catalog;
mod devices;
mod entities;
mod system;
pub mod validation;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::client::HubApi;
use crate::config::PolicyConfig;
use crate::error::{BridgeError, Result};
use crate::guards;

pub use catalog::{ToolDef, ToolSpec, TOOLS};

/// What an operation body gets to work with.
pub(crate) struct ToolContext<'a> {
    pub config: &'a PolicyConfig,
    pub hub: &'a dyn HubApi,
}

/// Dispatches named operations against one hub under one policy.
#[derive(Clone)]
pub struct ToolRegistry {
    config: Arc<PolicyConfig>,
    hub: Arc<dyn HubApi>,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("config", &self.config)
            .field("tools", &TOOLS.len())
            .finish()
    }
}

impl ToolRegistry {
    pub fn new(config: PolicyConfig, hub: Arc<dyn HubApi>) -> Self {
        Self {
            config: Arc::new(config),
            hub,
        }
    }

    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    pub fn has_tool(&self, name: &str) -> bool {
        catalog::find(name).is_some()
    }

    /// All operations with their read/write tag and input schema.
    pub fn catalog(&self) -> Vec<ToolSpec> {
        TOOLS.iter().map(ToolDef::spec).collect()
    }

    /// Run one operation. `input` may be `null` (treated as `{}`) or an object.
    pub async fn invoke(&self, name: &str, input: Value) -> Result<Value> {
        if catalog::find(name).is_none() {
            return Err(BridgeError::UnknownTool(name.to_string()));
        }
        guards::assert_tool_allowed(&self.config, name)?;

        let input = match input {
            Value::Null => Value::Object(Map::new()),
            Value::Object(_) => input,
            _ => return Err(BridgeError::validation("input must be an object")),
        };

        log::debug!("Invoking {}", name);
        let ctx = ToolContext {
            config: &self.config,
            hub: self.hub.as_ref(),
        };
        let result = dispatch(&ctx, name, &input).await;
        if let Err(e) = &result {
            log::debug!("{} failed ({}): {}", name, e.kind(), e);
        }
        result
    }
}

async fn dispatch(ctx: &ToolContext<'_>, name: &str, input: &Value) -> Result<Value> {
    if let Some(action) = devices::simple_action(name) {
        return devices::run_simple(ctx, action, input).await;
    }
    match name {
        "ha_status" => entities::status(ctx).await,
        "ha_list_entities" => entities::list_entities(ctx, input).await,
        "ha_get_state" => entities::get_state(ctx, input).await,
        "ha_search_entities" => entities::search_entities(ctx, input).await,
        "ha_list_services" => entities::list_services(ctx).await,
        "ha_light_list" => entities::light_list(ctx).await,
        "ha_climate_list" => entities::domain_list(ctx, "climate").await,
        "ha_sensor_list" => entities::domain_list(ctx, "sensor").await,

        "ha_light_on" => devices::light_on(ctx, input).await,
        "ha_climate_set_temp" => devices::climate_set_temp(ctx, input).await,
        "ha_climate_set_mode" => devices::climate_set_mode(ctx, input).await,
        "ha_climate_set_preset" => devices::climate_set_preset(ctx, input).await,
        "ha_media_volume" => devices::media_volume(ctx, input).await,
        "ha_media_play_media" => devices::media_play_media(ctx, input).await,
        "ha_cover_position" => devices::cover_position(ctx, input).await,
        "ha_script_run" => devices::script_run(ctx, input).await,
        "ha_automation_trigger" => devices::automation_trigger(ctx, input).await,

        "ha_history" => system::history(ctx, input).await,
        "ha_logbook" => system::logbook(ctx, input).await,
        "ha_call_service" => system::call_service(ctx, input).await,
        "ha_fire_event" => system::fire_event(ctx, input).await,
        "ha_render_template" => system::render_template(ctx, input).await,
        "ha_notify" => system::notify(ctx, input).await,

        _ => Err(BridgeError::UnknownTool(name.to_string())),
    }
}

pub(crate) fn to_json<T: Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value).map_err(|e| BridgeError::Decode(e.to_string()))
}
