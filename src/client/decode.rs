//! Adaptive decoding of successful hub responses.
//!
//! The hub answers with JSON for most endpoints but with plain text for
//! template rendering and some scalar results. The policy is explicit:
//! empty body, then JSON, then raw text.

use serde_json::{Map, Value};

/// Result of decoding a 2xx response body.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedBody {
    /// Zero-length body.
    Empty,
    /// Body parsed as JSON.
    Json(Value),
    /// Body that is not valid JSON, returned verbatim.
    Text(String),
}

impl DecodedBody {
    /// Collapse into the value handed back to callers: `{}` for an empty
    /// body, the parsed document, or the raw string.
    pub fn into_value(self) -> Value {
        match self {
            DecodedBody::Empty => Value::Object(Map::new()),
            DecodedBody::Json(value) => value,
            DecodedBody::Text(text) => Value::String(text),
        }
    }
}

/// Classify a response body.
pub fn decode_body(raw: &str) -> DecodedBody {
    if raw.is_empty() {
        return DecodedBody::Empty;
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(value) => DecodedBody::Json(value),
        Err(_) => DecodedBody::Text(raw.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_body() {
        assert_eq!(decode_body(""), DecodedBody::Empty);
        assert_eq!(decode_body("").into_value(), json!({}));
    }

    #[test]
    fn test_json_body() {
        assert_eq!(
            decode_body(r#"{"message": "API running."}"#),
            DecodedBody::Json(json!({"message": "API running."}))
        );
        assert_eq!(decode_body("[1,2]").into_value(), json!([1, 2]));
        // scalar JSON documents are still JSON
        assert_eq!(decode_body("42").into_value(), json!(42));
    }

    #[test]
    fn test_text_body_is_unmodified() {
        assert_eq!(
            decode_body("plain text result"),
            DecodedBody::Text("plain text result".to_string())
        );
        assert_eq!(
            decode_body("  22.5 °C\n").into_value(),
            Value::String("  22.5 °C\n".to_string())
        );
    }
}
