//! The `log_activity` tool.

use std::sync::Arc;

use jarvis_activity::{ActivityError, ActivityLogger, LogActivityParams, MAX_TAGS};
use jarvis_core::tools::{ToolDefinition, ToolInputSchema, ToolResult, text_result};
use serde_json::{Value, json};
use tracing::debug;

use crate::errors::ToolError;
use crate::traits::ContextTool;

/// Tool name as exposed to clients.
pub const LOG_ACTIVITY_TOOL: &str = "log_activity";

/// Records an activity through [`ActivityLogger::log_activity`].
pub struct LogActivityTool {
    logger: Arc<ActivityLogger>,
}

impl LogActivityTool {
    /// Tool writing through `logger`.
    pub fn new(logger: Arc<ActivityLogger>) -> Self {
        Self { logger }
    }
}

impl ContextTool for LogActivityTool {
    fn name(&self) -> &str {
        LOG_ACTIVITY_TOOL
    }

    fn definition(&self) -> ToolDefinition {
        let properties = json!({
            "activity": {
                "type": "string",
                "minLength": 1,
                "description": "What was done, e.g. \"Fixed authentication bug\""
            },
            "toolName": {
                "type": "string",
                "minLength": 1,
                "description": "Name of the assistant or tool that did the work"
            },
            "success": {
                "type": "boolean",
                "description": "Whether the work succeeded (default true)"
            },
            "error": {
                "type": "string",
                "description": "Error message when success is false"
            },
            "context": {
                "type": "string",
                "description": "Context name or a free-text note; a configured context name selects its root for file paths"
            },
            "tags": {
                "type": "array",
                "items": {"type": "string"},
                "description": format!("Tags, case-insensitive; only the first {MAX_TAGS} distinct tags are kept")
            },
            "filesAffected": {
                "type": "array",
                "items": {
                    "oneOf": [
                        {"type": "string"},
                        {
                            "type": "object",
                            "properties": {
                                "path": {"type": "string", "minLength": 1},
                                "operation": {"type": "string"}
                            },
                            "required": ["path"]
                        }
                    ]
                },
                "description": "Files touched: plain paths or {path, operation} objects"
            },
            "issueNumber": {
                "type": "integer",
                "description": "Related issue number"
            },
            "link": {
                "type": "string",
                "description": "Related URL"
            }
        });

        ToolDefinition {
            name: LOG_ACTIVITY_TOOL.into(),
            description: "Record an activity performed on the project, with optional tags and affected files. \
                          The activity is classified automatically."
                .into(),
            input_schema: ToolInputSchema::object(
                properties.as_object().cloned().unwrap_or_default(),
                &["activity", "toolName"],
            ),
        }
    }

    fn execute(&self, args: Value) -> Result<ToolResult, ToolError> {
        let params: LogActivityParams = serde_json::from_value(args)?;
        let logged = self.logger.log_activity(params).map_err(|e| match e {
            ActivityError::InvalidInput(message) => ToolError::Validation { message },
            other => ToolError::Storage {
                message: other.to_string(),
            },
        })?;
        debug!(id = %logged.id, activity_type = %logged.activity_type, "log_activity succeeded");
        Ok(text_result(
            format!(
                "Activity logged: {} (type: {})",
                logged.id, logged.activity_type
            ),
            false,
        ))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
