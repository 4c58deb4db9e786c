//! Static operation catalogue.
//!
//! One row per operation. The read/write tag is not stored here: it comes
//! from [`WRITE_TOOLS`](crate::guards::WRITE_TOOLS) so the write gate and the
//! advertised catalogue can never disagree.

use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::guards::is_write_tool;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    String,
    Number,
    Boolean,
    Object,
    Array,
}

impl ParamType {
    fn json_type(self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Number => "number",
            ParamType::Boolean => "boolean",
            ParamType::Object => "object",
            ParamType::Array => "array",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Param {
    pub name: &'static str,
    pub ty: ParamType,
    pub required: bool,
    pub description: &'static str,
}

const fn req(name: &'static str, ty: ParamType, description: &'static str) -> Param {
    Param {
        name,
        ty,
        required: true,
        description,
    }
}

const fn opt(name: &'static str, ty: ParamType, description: &'static str) -> Param {
    Param {
        name,
        ty,
        required: false,
        description,
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ToolDef {
    pub name: &'static str,
    pub description: &'static str,
    pub params: &'static [Param],
}

/// Advertised description of one operation.
#[derive(Debug, Clone, Serialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub read_only: bool,
    pub input_schema: Value,
}

impl ToolDef {
    pub fn read_only(&self) -> bool {
        !is_write_tool(self.name)
    }

    /// JSON Schema for the input object.
    pub fn input_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for param in self.params {
            properties.insert(
                param.name.to_string(),
                json!({"type": param.ty.json_type(), "description": param.description}),
            );
            if param.required {
                required.push(Value::String(param.name.to_string()));
            }
        }
        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    pub fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name.to_string(),
            description: self.description.to_string(),
            read_only: self.read_only(),
            input_schema: self.input_schema(),
        }
    }
}

use ParamType::{Array, Boolean, Number, Object, String as Str};

const ENTITY: Param = req("entity_id", Str, "Entity id, e.g. light.kitchen");

pub static TOOLS: &[ToolDef] = &[
    // -- entities ----------------------------------------------------------
    ToolDef {
        name: "ha_status",
        description: "Home Assistant configuration and version",
        params: &[],
    },
    ToolDef {
        name: "ha_list_entities",
        description: "List entities, optionally filtered by domain, state and area",
        params: &[
            opt("domain", Str, "Only entities in this domain"),
            opt("state", Str, "Only entities in this exact state"),
            opt("area", Str, "Only entities whose area_id matches"),
        ],
    },
    ToolDef {
        name: "ha_get_state",
        description: "Current state of one entity",
        params: &[ENTITY],
    },
    ToolDef {
        name: "ha_search_entities",
        description: "Case-insensitive search over entity ids and friendly names",
        params: &[req("pattern", Str, "Substring to look for")],
    },
    ToolDef {
        name: "ha_list_services",
        description: "Available services grouped by domain",
        params: &[],
    },
    // -- lights ------------------------------------------------------------
    ToolDef {
        name: "ha_light_on",
        description: "Turn a light on",
        params: &[
            ENTITY,
            opt("brightness", Number, "Brightness 0-255"),
            opt("color_temp", Number, "Color temperature in mireds"),
            opt("rgb_color", Array, "[r, g, b]"),
            opt("transition", Number, "Transition in seconds"),
        ],
    },
    ToolDef {
        name: "ha_light_off",
        description: "Turn a light off",
        params: &[ENTITY],
    },
    ToolDef {
        name: "ha_light_toggle",
        description: "Toggle a light",
        params: &[ENTITY],
    },
    ToolDef {
        name: "ha_light_list",
        description: "List lights with brightness and color",
        params: &[],
    },
    // -- switches ----------------------------------------------------------
    ToolDef {
        name: "ha_switch_on",
        description: "Turn a switch on",
        params: &[ENTITY],
    },
    ToolDef {
        name: "ha_switch_off",
        description: "Turn a switch off",
        params: &[ENTITY],
    },
    ToolDef {
        name: "ha_switch_toggle",
        description: "Toggle a switch",
        params: &[ENTITY],
    },
    // -- climate -----------------------------------------------------------
    ToolDef {
        name: "ha_climate_set_temp",
        description: "Set a thermostat target temperature",
        params: &[ENTITY, req("temperature", Number, "Target temperature")],
    },
    ToolDef {
        name: "ha_climate_set_mode",
        description: "Set a thermostat HVAC mode",
        params: &[ENTITY, req("hvac_mode", Str, "heat, cool, auto, off, ...")],
    },
    ToolDef {
        name: "ha_climate_set_preset",
        description: "Set a thermostat preset",
        params: &[ENTITY, req("preset_mode", Str, "eco, away, boost, ...")],
    },
    ToolDef {
        name: "ha_climate_list",
        description: "List climate entities",
        params: &[],
    },
    // -- media -------------------------------------------------------------
    ToolDef {
        name: "ha_media_play",
        description: "Resume playback",
        params: &[ENTITY],
    },
    ToolDef {
        name: "ha_media_pause",
        description: "Pause playback",
        params: &[ENTITY],
    },
    ToolDef {
        name: "ha_media_stop",
        description: "Stop playback",
        params: &[ENTITY],
    },
    ToolDef {
        name: "ha_media_volume",
        description: "Set media player volume",
        params: &[ENTITY, req("volume_level", Number, "Volume between 0.0 and 1.0")],
    },
    ToolDef {
        name: "ha_media_play_media",
        description: "Play a specific media item",
        params: &[
            ENTITY,
            req("content_id", Str, "Media content id or URL"),
            req("content_type", Str, "music, video, playlist, ..."),
        ],
    },
    // -- covers ------------------------------------------------------------
    ToolDef {
        name: "ha_cover_open",
        description: "Open a cover",
        params: &[ENTITY],
    },
    ToolDef {
        name: "ha_cover_close",
        description: "Close a cover",
        params: &[ENTITY],
    },
    ToolDef {
        name: "ha_cover_position",
        description: "Move a cover to a position",
        params: &[ENTITY, req("position", Number, "Position between 0 and 100")],
    },
    // -- scenes, scripts, automations --------------------------------------
    ToolDef {
        name: "ha_scene_activate",
        description: "Activate a scene",
        params: &[ENTITY],
    },
    ToolDef {
        name: "ha_script_run",
        description: "Run a script",
        params: &[ENTITY, opt("variables", Object, "Script variables")],
    },
    ToolDef {
        name: "ha_automation_trigger",
        description: "Trigger an automation",
        params: &[ENTITY, opt("skip_condition", Boolean, "Skip the automation's conditions")],
    },
    ToolDef {
        name: "ha_sensor_list",
        description: "List sensors",
        params: &[],
    },
    // -- history -----------------------------------------------------------
    ToolDef {
        name: "ha_history",
        description: "State history for a time window",
        params: &[
            opt("entity_id", Str, "Restrict to one entity"),
            opt("start", Str, "ISO-8601 start, defaults to the configured window"),
            opt("end", Str, "ISO-8601 end"),
        ],
    },
    ToolDef {
        name: "ha_logbook",
        description: "Logbook entries for a time window",
        params: &[
            opt("entity_id", Str, "Restrict to one entity"),
            opt("start", Str, "ISO-8601 start, defaults to the configured window"),
            opt("end", Str, "ISO-8601 end"),
        ],
    },
    // -- generic -----------------------------------------------------------
    ToolDef {
        name: "ha_call_service",
        description: "Call any service in an allowed domain",
        params: &[
            req("domain", Str, "Service domain"),
            req("service", Str, "Service name"),
            opt("service_data", Object, "Service payload"),
        ],
    },
    ToolDef {
        name: "ha_fire_event",
        description: "Fire a custom event",
        params: &[
            req("event_type", Str, "Event type"),
            opt("event_data", Object, "Event payload"),
        ],
    },
    ToolDef {
        name: "ha_render_template",
        description: "Render a Jinja2 template on the hub",
        params: &[
            req("template", Str, "Template source"),
            opt("variables", Object, "Template variables"),
        ],
    },
    ToolDef {
        name: "ha_notify",
        description: "Send a notification through a notify service",
        params: &[
            req("target", Str, "Notify service name, e.g. mobile_app_phone"),
            req("message", Str, "Message body"),
            opt("title", Str, "Message title"),
            opt("data", Object, "Platform specific extras"),
        ],
    },
];

/// Look up an operation by name.
pub fn find(name: &str) -> Option<&'static ToolDef> {
    TOOLS.iter().find(|def| def.name == name)
}
