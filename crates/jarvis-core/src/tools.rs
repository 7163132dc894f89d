//! Tool definition and result types.
//!
//! Describes the callable operations a client can invoke through
//! `listTools` / `callTool`, plus the result type every tool returns.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ─────────────────────────────────────────────────────────────────────────────
// Tool schema
// ─────────────────────────────────────────────────────────────────────────────

/// JSON Schema describing a tool's input object.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolInputSchema {
    /// Top-level JSON Schema type.
    #[serde(rename = "type")]
    pub schema_type: String,
    /// Property definitions (when type is `object`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<serde_json::Map<String, Value>>,
    /// Required property names.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
    /// Catch-all for additional JSON Schema keywords.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl ToolInputSchema {
    /// Build an `object` schema from its properties and required names.
    pub fn object(properties: serde_json::Map<String, Value>, required: &[&str]) -> Self {
        Self {
            schema_type: "object".into(),
            properties: Some(properties),
            required: if required.is_empty() {
                None
            } else {
                Some(required.iter().map(|r| (*r).to_owned()).collect())
            },
            extra: serde_json::Map::new(),
        }
    }

    /// Render the schema as a plain JSON value (for validators).
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// A tool descriptor as returned by `listTools`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    /// Tool name (unique identifier).
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// JSON Schema for the tool's arguments.
    pub input_schema: ToolInputSchema,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tool result
// ─────────────────────────────────────────────────────────────────────────────

/// One content block in a tool result.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolResultContent {
    /// Plain text block.
    Text {
        /// The text.
        text: String,
    },
}

impl ToolResultContent {
    /// Create a text block.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }
}

/// Result of a tool call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    /// Content blocks.
    pub content: Vec<ToolResultContent>,
    /// Set to `Some(true)` when the call failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

impl ToolResult {
    /// Whether this result is flagged as an error.
    pub fn is_error(&self) -> bool {
        self.is_error == Some(true)
    }

    /// All text blocks joined with newlines.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .map(|c| match c {
                ToolResultContent::Text { text } => text.as_str(),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Factory helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Create a simple text result.
#[must_use]
pub fn text_result(text: impl Into<String>, is_error: bool) -> ToolResult {
    ToolResult {
        content: vec![ToolResultContent::text(text)],
        is_error: if is_error { Some(true) } else { None },
    }
}

/// Create an error result.
#[must_use]
pub fn error_result(message: impl Into<String>) -> ToolResult {
    text_result(message, true)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_result_omits_is_error() {
        let result = text_result("ok", false);
        let v = serde_json::to_value(&result).unwrap();
        assert_eq!(v, json!({"content": [{"type": "text", "text": "ok"}]}));
        assert!(!result.is_error());
    }

    #[test]
    fn error_result_sets_flag() {
        let result = error_result("boom");
        let v = serde_json::to_value(&result).unwrap();
        assert_eq!(v["isError"], true);
        assert_eq!(v["content"][0]["text"], "boom");
        assert!(result.is_error());
    }

    #[test]
    fn definition_serializes_input_schema_camel_case() {
        let mut props = serde_json::Map::new();
        let _ = props.insert("activity".into(), json!({"type": "string"}));
        let def = ToolDefinition {
            name: "log_activity".into(),
            description: "Log it".into(),
            input_schema: ToolInputSchema::object(props, &["activity"]),
        };
        let v = serde_json::to_value(&def).unwrap();
        assert_eq!(v["inputSchema"]["type"], "object");
        assert_eq!(v["inputSchema"]["required"], json!(["activity"]));
        assert_eq!(v["inputSchema"]["properties"]["activity"]["type"], "string");
    }

    #[test]
    fn object_schema_without_required_skips_field() {
        let schema = ToolInputSchema::object(serde_json::Map::new(), &[]);
        let v = schema.to_value();
        assert!(v.get("required").is_none());
    }

    #[test]
    fn extra_keywords_flatten() {
        let mut schema = ToolInputSchema::object(serde_json::Map::new(), &[]);
        let _ = schema
            .extra
            .insert("additionalProperties".into(), json!(false));
        let v = schema.to_value();
        assert_eq!(v["additionalProperties"], false);
    }

    #[test]
    fn text_joins_blocks() {
        let result = ToolResult {
            content: vec![ToolResultContent::text("a"), ToolResultContent::text("b")],
            is_error: None,
        };
        assert_eq!(result.text(), "a\nb");
    }

    #[test]
    fn result_round_trips() {
        let raw = json!({"content": [{"type": "text", "text": "x"}], "isError": true});
        let parsed: ToolResult = serde_json::from_value(raw).unwrap();
        assert!(parsed.is_error());
        assert_eq!(parsed.text(), "x");
    }
}
