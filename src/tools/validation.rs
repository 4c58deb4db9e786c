//! Input coercion shared by every operation.
//!
//! Operation input is a loose JSON object. These helpers pull typed values
//! out of it and produce the caller-facing validation messages.

use serde_json::{Map, Number, Value};

use crate::config::PolicyConfig;
use crate::error::{BridgeError, Result};
use crate::guards::{assert_entity_allowed, EntityRef};

/// Largest integer an f64 represents exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Trimmed, non-empty scalar. Numbers are accepted and stringified.
pub fn required_string(input: &Value, field: &str) -> Result<String> {
    let text = match input.get(field) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    };
    if text.is_empty() {
        return Err(BridgeError::validation(format!("{} is required", field)));
    }
    Ok(text)
}

/// Trimmed string field. Absent, null or blank is `None`; any other type is
/// rejected rather than ignored.
pub fn optional_string(input: &Value, field: &str) -> Result<Option<String>> {
    match input.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
        }
        Some(_) => Err(BridgeError::validation(format!(
            "{} must be a string",
            field
        ))),
    }
}

/// Whether the caller supplied `field` at all (null counts as absent).
pub fn is_present(input: &Value, field: &str) -> bool {
    !matches!(input.get(field), None | Some(Value::Null))
}

/// Coerce a JSON number or numeric string to a finite `f64`.
pub fn to_number(value: Option<&Value>, field: &str) -> Result<f64> {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(n) if n.is_finite() => Ok(n),
        _ => Err(BridgeError::validation(format!(
            "{} must be a valid number",
            field
        ))),
    }
}

/// [`to_number`] on `input[field]`.
pub fn number_field(input: &Value, field: &str) -> Result<f64> {
    to_number(input.get(field), field)
}

/// Inclusive range check.
pub fn bounded(value: f64, min: f64, max: f64, message: &str) -> Result<f64> {
    if value < min || value > max {
        return Err(BridgeError::validation(message));
    }
    Ok(value)
}

/// JSON form of a validated number: integral values become JSON integers.
pub fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        Value::from(n as i64)
    } else {
        Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
    }
}

/// Optional JSON object field. Absent or null is `None`.
pub fn optional_object(input: &Value, field: &str) -> Result<Option<Map<String, Value>>> {
    match input.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(map)) => Ok(Some(map.clone())),
        Some(_) => Err(BridgeError::validation(format!(
            "{} must be an object",
            field
        ))),
    }
}

/// Loose truthiness used for boolean flags.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(false),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Required `entity_id` that passes the allow-list and belongs to `domain`.
pub fn domain_entity(config: &PolicyConfig, input: &Value, domain: &str) -> Result<EntityRef> {
    let raw = required_string(input, "entity_id")?;
    let entity = assert_entity_allowed(config, &raw)?;
    if entity.domain != domain {
        return Err(BridgeError::validation(format!(
            "entity_id must be in {} domain",
            domain
        )));
    }
    Ok(entity)
}
