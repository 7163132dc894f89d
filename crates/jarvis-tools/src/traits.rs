//! The trait every tool implements.

use jarvis_core::tools::{ToolDefinition, ToolResult};
use serde_json::Value;

use crate::errors::ToolError;

/// A callable operation with a JSON-schema input.
///
/// Handlers run synchronously to completion. They receive arguments that
/// already passed schema validation.
pub trait ContextTool: Send + Sync {
    /// Exact name callers use.
    fn name(&self) -> &str;

    /// Listing entry, including the input schema.
    fn definition(&self) -> ToolDefinition;

    /// Run the tool.
    fn execute(&self, args: Value) -> Result<ToolResult, ToolError>;
}
