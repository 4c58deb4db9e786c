//! Read-side operations over entity states and the service registry.

use serde_json::{Map, Value};

use super::validation::{optional_string, required_string};
use super::{to_json, ToolContext};
use crate::client::EntityState;
use crate::config::PolicyConfig;
use crate::error::Result;
use crate::guards::{assert_domain_allowed, assert_entity_allowed};

/// Drop entities whose domain is outside a non-empty allow-list.
pub(crate) fn filter_allowed(config: &PolicyConfig, states: Vec<EntityState>) -> Vec<EntityState> {
    if !config.has_domain_restrictions() {
        return states;
    }
    states
        .into_iter()
        .filter(|s| s.domain().map_or(false, |d| config.allows_domain(&d)))
        .collect()
}

fn in_domain(state: &EntityState, domain: &str) -> bool {
    state
        .entity_id
        .strip_prefix(domain)
        .map_or(false, |rest| rest.starts_with('.'))
}

/// `attributes.area_id` rendered as text; missing or null is `""`.
fn area_of(state: &EntityState) -> String {
    match state.attributes.get("area_id") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

pub(super) async fn status(ctx: &ToolContext<'_>) -> Result<Value> {
    ctx.hub.get_config().await
}

pub(super) async fn list_entities(ctx: &ToolContext<'_>, input: &Value) -> Result<Value> {
    let domain = optional_string(input, "domain")?.map(|d| d.to_lowercase());
    if let Some(domain) = &domain {
        assert_domain_allowed(ctx.config, domain)?;
    }
    let state_filter = optional_string(input, "state")?;
    let area_filter = optional_string(input, "area")?;

    let states = filter_allowed(ctx.config, ctx.hub.get_states().await?);
    let matched: Vec<EntityState> = states
        .into_iter()
        .filter(|s| domain.as_deref().map_or(true, |d| in_domain(s, d)))
        .filter(|s| state_filter.as_deref().map_or(true, |st| s.state == st))
        .filter(|s| area_filter.as_deref().map_or(true, |a| area_of(s) == a))
        .collect();
    to_json(&matched)
}

pub(super) async fn get_state(ctx: &ToolContext<'_>, input: &Value) -> Result<Value> {
    let entity = assert_entity_allowed(ctx.config, &required_string(input, "entity_id")?)?;
    ctx.hub.get_state(&entity.to_string()).await
}

pub(super) async fn search_entities(ctx: &ToolContext<'_>, input: &Value) -> Result<Value> {
    let pattern = required_string(input, "pattern")?.to_lowercase();
    let states = filter_allowed(ctx.config, ctx.hub.get_states().await?);
    let matched: Vec<EntityState> = states
        .into_iter()
        .filter(|s| {
            s.entity_id.to_lowercase().contains(&pattern)
                || s
                    .friendly_name()
                    .map_or(false, |n| n.to_lowercase().contains(&pattern))
        })
        .collect();
    to_json(&matched)
}

pub(super) async fn list_services(ctx: &ToolContext<'_>) -> Result<Value> {
    let services: Vec<_> = ctx
        .hub
        .get_services()
        .await?
        .into_iter()
        .filter(|s| ctx.config.allows_domain(&s.domain))
        .collect();
    to_json(&services)
}

/// All entities of one domain, after a domain guard on it.
pub(super) async fn domain_list(ctx: &ToolContext<'_>, domain: &str) -> Result<Value> {
    assert_domain_allowed(ctx.config, domain)?;
    let states: Vec<EntityState> = ctx
        .hub
        .get_states()
        .await?
        .into_iter()
        .filter(|s| in_domain(s, domain))
        .collect();
    to_json(&states)
}

const LIGHT_FIELDS: &[&str] = &["friendly_name", "brightness", "color_temp", "rgb_color"];

pub(super) async fn light_list(ctx: &ToolContext<'_>) -> Result<Value> {
    assert_domain_allowed(ctx.config, "light")?;
    let lights: Vec<Value> = ctx
        .hub
        .get_states()
        .await?
        .into_iter()
        .filter(|s| in_domain(s, "light"))
        .map(|s| {
            let mut row = Map::new();
            for key in LIGHT_FIELDS {
                if let Some(value) = s.attributes.get(*key).filter(|v| !v.is_null()) {
                    row.insert(key.to_string(), value.clone());
                }
            }
            row.insert("entity_id".to_string(), Value::String(s.entity_id));
            row.insert("state".to_string(), Value::String(s.state));
            Value::Object(row)
        })
        .collect();
    Ok(Value::Array(lights))
}
