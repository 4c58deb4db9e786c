//! Authorization guards.
//!
//! Small pure predicates over a [`PolicyConfig`]. The tool registry calls
//! them in a fixed order (write gate, then domain/entity allow-list) before
//! any request leaves the process. None of them hold state, so they are safe
//! to call from concurrent invocations.

use std::collections::HashSet;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::PolicyConfig;
use crate::error::{BridgeError, Result};

/// Tools that mutate hub state. Everything else is read-only and stays
/// available when the write gate is on.
pub static WRITE_TOOLS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "ha_light_on",
        "ha_light_off",
        "ha_light_toggle",
        "ha_switch_on",
        "ha_switch_off",
        "ha_switch_toggle",
        "ha_climate_set_temp",
        "ha_climate_set_mode",
        "ha_climate_set_preset",
        "ha_media_play",
        "ha_media_pause",
        "ha_media_stop",
        "ha_media_volume",
        "ha_media_play_media",
        "ha_cover_open",
        "ha_cover_close",
        "ha_cover_position",
        "ha_scene_activate",
        "ha_script_run",
        "ha_automation_trigger",
        "ha_call_service",
        "ha_fire_event",
        "ha_notify",
    ]
    .into_iter()
    .collect()
});

static ENTITY_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9_]+\.[a-z0-9_]+$").expect("static regex"));

/// Parsed `{domain}.{object_id}` identifier, always lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityRef {
    pub domain: String,
    pub object_id: String,
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.domain, self.object_id)
    }
}

/// Whether `tool_name` carries the write tag.
pub fn is_write_tool(tool_name: &str) -> bool {
    WRITE_TOOLS.contains(tool_name)
}

/// Reject write-tagged tools while the write gate is on.
pub fn assert_tool_allowed(config: &PolicyConfig, tool_name: &str) -> Result<()> {
    if config.read_only && is_write_tool(tool_name) {
        log::warn!("Write gate rejected {}", tool_name);
        return Err(BridgeError::authorization(format!(
            "Tool {} is blocked because readOnly=true",
            tool_name
        )));
    }
    Ok(())
}

/// Reject domains outside a non-empty allow-list. Case-insensitive.
pub fn assert_domain_allowed(config: &PolicyConfig, domain: &str) -> Result<()> {
    if !config.allows_domain(domain) {
        log::warn!("Allow-list rejected domain {}", domain);
        return Err(BridgeError::authorization(format!(
            "Domain {} is blocked by allowedDomains policy",
            domain
        )));
    }
    Ok(())
}

/// Parse and lowercase an entity id. Exactly one dot, both halves `[a-z0-9_]+`.
pub fn parse_entity_id(raw: &str) -> Result<EntityRef> {
    let normalized = raw.trim().to_lowercase();
    let parts = normalized
        .split_once('.')
        .filter(|_| ENTITY_ID_RE.is_match(&normalized));
    match parts {
        Some((domain, object_id)) => Ok(EntityRef {
            domain: domain.to_string(),
            object_id: object_id.to_string(),
        }),
        None => Err(BridgeError::validation(format!(
            "Invalid entity_id '{}'. Expected format: {{domain}}.{{object_id}}",
            raw
        ))),
    }
}

/// [`parse_entity_id`] followed by [`assert_domain_allowed`] on the parsed
/// domain. Returns the parsed reference so callers don't parse twice.
pub fn assert_entity_allowed(config: &PolicyConfig, raw: &str) -> Result<EntityRef> {
    let parsed = parse_entity_id(raw)?;
    assert_domain_allowed(config, &parsed.domain)?;
    Ok(parsed)
}
