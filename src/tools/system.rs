//! History, logbook and the generic service/event/template surface.

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde_json::Value;

use super::validation::{optional_object, optional_string, required_string};
use super::ToolContext;
use crate::client::ServiceInvocation;
use crate::config::PolicyConfig;
use crate::error::Result;
use crate::guards::{assert_domain_allowed, assert_entity_allowed, parse_entity_id};

/// `now - hours` as an RFC 3339 UTC timestamp with millisecond precision.
pub(crate) fn window_start(now: DateTime<Utc>, hours: u64) -> String {
    let start = i64::try_from(hours)
        .ok()
        .and_then(Duration::try_hours)
        .and_then(|window| now.checked_sub_signed(window))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    start.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Shared input handling for history and logbook lookups.
struct TimeWindow {
    start: String,
    end: Option<String>,
    entity_id: Option<String>,
}

fn time_window(ctx: &ToolContext<'_>, input: &Value) -> Result<TimeWindow> {
    let entity_id = match optional_string(input, "entity_id")? {
        Some(raw) => Some(assert_entity_allowed(ctx.config, &raw)?.to_string()),
        None => None,
    };
    let start = optional_string(input, "start")?
        .unwrap_or_else(|| window_start(Utc::now(), ctx.config.history_window_hours));
    Ok(TimeWindow {
        start,
        end: optional_string(input, "end")?,
        entity_id,
    })
}

fn entity_allowed(config: &PolicyConfig, record: &Value) -> bool {
    record
        .get("entity_id")
        .and_then(Value::as_str)
        .and_then(|id| parse_entity_id(id).ok())
        .map_or(false, |entity| config.allows_domain(&entity.domain))
}

/// History comes back as one array of state records per entity.
fn filter_history(config: &PolicyConfig, history: Value) -> Value {
    match history {
        Value::Array(series) => Value::Array(
            series
                .into_iter()
                .filter(|s| {
                    s.as_array()
                        .and_then(|records| records.first())
                        .map_or(false, |first| entity_allowed(config, first))
                })
                .collect(),
        ),
        other => other,
    }
}

fn filter_logbook(config: &PolicyConfig, logbook: Value) -> Value {
    match logbook {
        Value::Array(entries) => Value::Array(
            entries
                .into_iter()
                .filter(|e| entity_allowed(config, e))
                .collect(),
        ),
        other => other,
    }
}

pub(super) async fn history(ctx: &ToolContext<'_>, input: &Value) -> Result<Value> {
    let window = time_window(ctx, input)?;
    let history = ctx
        .hub
        .get_history(&window.start, window.entity_id.as_deref(), window.end.as_deref())
        .await?;
    if window.entity_id.is_none() && ctx.config.has_domain_restrictions() {
        return Ok(filter_history(ctx.config, history));
    }
    Ok(history)
}

pub(super) async fn logbook(ctx: &ToolContext<'_>, input: &Value) -> Result<Value> {
    let window = time_window(ctx, input)?;
    let logbook = ctx
        .hub
        .get_logbook(&window.start, window.entity_id.as_deref(), window.end.as_deref())
        .await?;
    if window.entity_id.is_none() && ctx.config.has_domain_restrictions() {
        return Ok(filter_logbook(ctx.config, logbook));
    }
    Ok(logbook)
}

pub(super) async fn call_service(ctx: &ToolContext<'_>, input: &Value) -> Result<Value> {
    let domain = required_string(input, "domain")?.to_lowercase();
    assert_domain_allowed(ctx.config, &domain)?;
    let service = required_string(input, "service")?.to_lowercase();
    let data = optional_object(input, "service_data")?.unwrap_or_default();
    log::info!("Generic service call {}.{}", domain, service);
    ctx.hub
        .call_service(ServiceInvocation::new(domain, service).with_payload(data))
        .await
}

pub(super) async fn fire_event(ctx: &ToolContext<'_>, input: &Value) -> Result<Value> {
    let event_type = required_string(input, "event_type")?;
    let data = optional_object(input, "event_data")?.unwrap_or_default();
    ctx.hub.fire_event(&event_type, data).await
}

pub(super) async fn render_template(ctx: &ToolContext<'_>, input: &Value) -> Result<Value> {
    let template = required_string(input, "template")?;
    let variables = optional_object(input, "variables")?.unwrap_or_default();
    ctx.hub.render_template(&template, variables).await
}

pub(super) async fn notify(ctx: &ToolContext<'_>, input: &Value) -> Result<Value> {
    assert_domain_allowed(ctx.config, "notify")?;
    let target = required_string(input, "target")?;
    let message = required_string(input, "message")?;

    let mut invocation =
        ServiceInvocation::new("notify", target).with_field("message", Value::String(message));
    if let Some(title) = optional_string(input, "title")? {
        invocation = invocation.with_field("title", Value::String(title));
    }
    if let Some(data) = optional_object(input, "data")? {
        invocation = invocation.with_field("data", Value::Object(data));
    }
    ctx.hub.call_service(invocation).await
}
