//! Device control: one service call per invocation, always with an
//! `entity_id` in the operation's own domain.

use serde_json::Value;

use super::validation::{
    bounded, domain_entity, is_present, number_field, number_value, optional_object,
    required_string, truthy,
};
use super::ToolContext;
use crate::client::ServiceInvocation;
use crate::error::Result;

/// Operations whose whole payload is the entity id.
#[derive(Debug, Clone, Copy)]
pub(super) struct SimpleAction {
    pub tool: &'static str,
    pub domain: &'static str,
    pub service: &'static str,
}

const fn action(tool: &'static str, domain: &'static str, service: &'static str) -> SimpleAction {
    SimpleAction {
        tool,
        domain,
        service,
    }
}

static SIMPLE_ACTIONS: &[SimpleAction] = &[
    action("ha_light_off", "light", "turn_off"),
    action("ha_light_toggle", "light", "toggle"),
    action("ha_switch_on", "switch", "turn_on"),
    action("ha_switch_off", "switch", "turn_off"),
    action("ha_switch_toggle", "switch", "toggle"),
    action("ha_media_play", "media_player", "media_play"),
    action("ha_media_pause", "media_player", "media_pause"),
    action("ha_media_stop", "media_player", "media_stop"),
    action("ha_cover_open", "cover", "open_cover"),
    action("ha_cover_close", "cover", "close_cover"),
    action("ha_scene_activate", "scene", "turn_on"),
];

pub(super) fn simple_action(tool: &str) -> Option<&'static SimpleAction> {
    SIMPLE_ACTIONS.iter().find(|a| a.tool == tool)
}

/// Validate the entity and start an invocation carrying its normalized id.
fn targeted(
    ctx: &ToolContext<'_>,
    input: &Value,
    domain: &str,
    service: &str,
) -> Result<ServiceInvocation> {
    let entity = domain_entity(ctx.config, input, domain)?;
    Ok(ServiceInvocation::new(domain, service).with_field("entity_id", Value::String(entity.to_string())))
}

pub(super) async fn run_simple(
    ctx: &ToolContext<'_>,
    action: &SimpleAction,
    input: &Value,
) -> Result<Value> {
    let invocation = targeted(ctx, input, action.domain, action.service)?;
    ctx.hub.call_service(invocation).await
}

pub(super) async fn light_on(ctx: &ToolContext<'_>, input: &Value) -> Result<Value> {
    let mut invocation = targeted(ctx, input, "light", "turn_on")?;
    for field in ["brightness", "color_temp"] {
        if is_present(input, field) {
            let n = number_field(input, field)?;
            invocation = invocation.with_field(field, number_value(n));
        }
    }
    if let Some(rgb) = input.get("rgb_color").filter(|v| !v.is_null()) {
        invocation = invocation.with_field("rgb_color", rgb.clone());
    }
    if is_present(input, "transition") {
        let n = number_field(input, "transition")?;
        invocation = invocation.with_field("transition", number_value(n));
    }
    ctx.hub.call_service(invocation).await
}

pub(super) async fn climate_set_temp(ctx: &ToolContext<'_>, input: &Value) -> Result<Value> {
    let invocation = targeted(ctx, input, "climate", "set_temperature")?;
    let temperature = number_field(input, "temperature")?;
    ctx.hub
        .call_service(invocation.with_field("temperature", number_value(temperature)))
        .await
}

pub(super) async fn climate_set_mode(ctx: &ToolContext<'_>, input: &Value) -> Result<Value> {
    let invocation = targeted(ctx, input, "climate", "set_hvac_mode")?;
    let mode = required_string(input, "hvac_mode")?;
    ctx.hub
        .call_service(invocation.with_field("hvac_mode", Value::String(mode)))
        .await
}

pub(super) async fn climate_set_preset(ctx: &ToolContext<'_>, input: &Value) -> Result<Value> {
    let invocation = targeted(ctx, input, "climate", "set_preset_mode")?;
    let preset = required_string(input, "preset_mode")?;
    ctx.hub
        .call_service(invocation.with_field("preset_mode", Value::String(preset)))
        .await
}

pub(super) async fn media_volume(ctx: &ToolContext<'_>, input: &Value) -> Result<Value> {
    let invocation = targeted(ctx, input, "media_player", "volume_set")?;
    let volume = bounded(
        number_field(input, "volume_level")?,
        0.0,
        1.0,
        "volume_level must be between 0.0 and 1.0",
    )?;
    ctx.hub
        .call_service(invocation.with_field("volume_level", number_value(volume)))
        .await
}

pub(super) async fn media_play_media(ctx: &ToolContext<'_>, input: &Value) -> Result<Value> {
    let invocation = targeted(ctx, input, "media_player", "play_media")?;
    let content_id = required_string(input, "content_id")?;
    let content_type = required_string(input, "content_type")?;
    let invocation = invocation
        .with_field("media_content_id", Value::String(content_id))
        .with_field("media_content_type", Value::String(content_type));
    ctx.hub.call_service(invocation).await
}

pub(super) async fn cover_position(ctx: &ToolContext<'_>, input: &Value) -> Result<Value> {
    let invocation = targeted(ctx, input, "cover", "set_cover_position")?;
    let position = bounded(
        number_field(input, "position")?,
        0.0,
        100.0,
        "position must be between 0 and 100",
    )?;
    ctx.hub
        .call_service(invocation.with_field("position", number_value(position)))
        .await
}

pub(super) async fn script_run(ctx: &ToolContext<'_>, input: &Value) -> Result<Value> {
    let invocation = targeted(ctx, input, "script", "turn_on")?;
    let variables = optional_object(input, "variables")?.unwrap_or_default();
    ctx.hub
        .call_service(invocation.with_field("variables", Value::Object(variables)))
        .await
}

pub(super) async fn automation_trigger(ctx: &ToolContext<'_>, input: &Value) -> Result<Value> {
    let mut invocation = targeted(ctx, input, "automation", "trigger")?;
    if let Some(flag) = input.get("skip_condition").filter(|v| !v.is_null()) {
        invocation = invocation.with_field("skip_condition", Value::Bool(truthy(flag)));
    }
    ctx.hub.call_service(invocation).await
}
