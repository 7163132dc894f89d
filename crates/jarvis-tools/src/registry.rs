//! Tool registry and dispatch.
//!
//! [`ToolRegistry::call_tool`] never fails: every outcome, including an
//! unknown name or a storage failure, comes back as a [`ToolResult`].
//! Input problems and system problems are worded differently so a client
//! knows whether to fix its arguments or escalate.

use std::collections::HashMap;
use std::sync::Arc;

use jarvis_core::tools::{ToolDefinition, ToolResult, error_result};
use jsonschema::{Draft, JSONSchema};
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::errors::ToolError;
use crate::traits::ContextTool;

struct RegisteredTool {
    tool: Arc<dyn ContextTool>,
    schema: JSONSchema,
}

/// Name-keyed registry of tools with compiled input schemas.
pub struct ToolRegistry {
    tools: HashMap<String, RegisteredTool>,
}

impl ToolRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool, replacing any tool with the same name.
    ///
    /// Fails if the tool's input schema does not compile.
    pub fn register(&mut self, tool: Arc<dyn ContextTool>) -> Result<(), ToolError> {
        let definition = tool.definition();
        let schema_value = definition.input_schema.to_value();
        let schema = JSONSchema::options()
            .with_draft(Draft::Draft7)
            .compile(&schema_value)
            .map_err(|e| ToolError::InvalidSchema {
                tool: definition.name.clone(),
                message: e.to_string(),
            })?;
        debug!(tool_name = tool.name(), "tool registered");
        let _ = self
            .tools
            .insert(tool.name().to_owned(), RegisteredTool { tool, schema });
        Ok(())
    }

    /// Tool descriptors sorted by name.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut defs: Vec<ToolDefinition> =
            self.tools.values().map(|r| r.tool.definition()).collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Validate `args` against the tool's schema and run it.
    pub fn call_tool(&self, name: &str, args: Value) -> ToolResult {
        let Some(registered) = self.tools.get(name) else {
            warn!(tool_name = name, "unknown tool");
            return error_result(format!("Unknown tool: {name}"));
        };

        let violations = schema_violations(&registered.schema, &args);
        if !violations.is_empty() {
            warn!(tool_name = name, count = violations.len(), "tool arguments failed validation");
            return error_result(format!(
                "Invalid arguments for {name}:\n- {}",
                violations.join("\n- ")
            ));
        }

        match registered.tool.execute(args) {
            Ok(result) => result,
            Err(e) if e.is_input_error() => {
                warn!(tool_name = name, error = %e, "tool rejected input");
                error_result(format!("Invalid input for {name}: {e}"))
            }
            Err(e) => {
                error!(tool_name = name, error = %e, "tool failed with a system error");
                error_result(system_failure_message(name, &e))
            }
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn schema_violations(schema: &JSONSchema, args: &Value) -> Vec<String> {
    match schema.validate(args) {
        Ok(()) => Vec::new(),
        Err(errors) => errors
            .map(|e| {
                let path = e.instance_path.to_string();
                let path = if path.is_empty() { "(root)".to_owned() } else { path };
                format!("{path}: {e}")
            })
            .collect(),
    }
}

/// Wording for failures the caller cannot fix.
pub fn system_failure_message(tool_name: &str, err: &ToolError) -> String {
    format!(
        "{tool_name} failed: {err}. This is a system error (database/storage failure), \
         not a problem with your input. Report this failure to the user instead of retrying."
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use jarvis_core::tools::{ToolInputSchema, text_result};
    use serde_json::json;

    /// Echoes `msg`; `mode` selects a failure.
    struct StubTool {
        tool_name: String,
    }

    impl StubTool {
        fn new(name: &str) -> Arc<Self> {
            Arc::new(Self {
                tool_name: name.into(),
            })
        }
    }

    impl ContextTool for StubTool {
        fn name(&self) -> &str {
            &self.tool_name
        }

        fn definition(&self) -> ToolDefinition {
            let props = json!({
                "msg": {"type": "string", "minLength": 1},
                "mode": {"type": "string", "enum": ["ok", "input", "storage"]}
            });
            ToolDefinition {
                name: self.tool_name.clone(),
                description: format!("Stub {}", self.tool_name),
                input_schema: ToolInputSchema::object(
                    props.as_object().cloned().unwrap(),
                    &["msg"],
                ),
            }
        }

        fn execute(&self, args: Value) -> Result<ToolResult, ToolError> {
            let msg = args["msg"].as_str().unwrap_or_default().to_owned();
            match args["mode"].as_str() {
                Some("input") => Err(ToolError::validation("msg is not acceptable")),
                Some("storage") => Err(ToolError::Storage {
                    message: "disk I/O error".into(),
                }),
                _ => Ok(text_result(msg, false)),
            }
        }
    }

    struct BrokenSchemaTool;

    impl ContextTool for BrokenSchemaTool {
        fn name(&self) -> &str {
            "broken"
        }

        fn definition(&self) -> ToolDefinition {
            let mut schema = ToolInputSchema::object(serde_json::Map::new(), &[]);
            schema.schema_type = "not-a-type".into();
            ToolDefinition {
                name: "broken".into(),
                description: String::new(),
                input_schema: schema,
            }
        }

        fn execute(&self, _args: Value) -> Result<ToolResult, ToolError> {
            Ok(text_result("", false))
        }
    }

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register(StubTool::new("echo")).unwrap();
        registry
    }

    #[test]
    fn register_and_lookup() {
        let mut registry = registry();
        registry.register(StubTool::new("alpha")).unwrap();
        assert_eq!(registry.len(), 2);
        assert!(!registry.is_empty());
        let names: Vec<_> = registry.definitions().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["alpha", "echo"]);
        assert_eq!(registry.call_tool("alpha", json!({"msg": "hi"})).text(), "hi");
    }

    #[test]
    fn register_rejects_uncompilable_schema() {
        let mut registry = ToolRegistry::default();
        let err = registry.register(Arc::new(BrokenSchemaTool)).unwrap_err();
        assert!(matches!(err, ToolError::InvalidSchema { ref tool, .. } if tool == "broken"));
        assert!(registry.is_empty());
    }

    #[test]
    fn unknown_tool_is_error_result() {
        let result = registry().call_tool("nope", json!({}));
        assert!(result.is_error());
        assert_eq!(result.text(), "Unknown tool: nope");
    }

    #[test]
    fn success_passes_through() {
        let result = registry().call_tool("echo", json!({"msg": "hi"}));
        assert!(!result.is_error());
        assert_eq!(result.text(), "hi");
    }

    #[test]
    fn schema_violations_are_listed_with_paths() {
        let result = registry().call_tool("echo", json!({"msg": "", "mode": "weird"}));
        assert!(result.is_error());
        let text = result.text();
        assert!(text.starts_with("Invalid arguments for echo:"));
        assert!(text.contains("/msg: "));
        assert!(text.contains("/mode: "));
    }

    #[test]
    fn missing_required_reported_at_root() {
        let result = registry().call_tool("echo", json!({}));
        assert!(result.is_error());
        assert!(result.text().contains("(root): "));
        assert!(result.text().contains("msg"));
    }

    #[test]
    fn handler_input_error() {
        let result = registry().call_tool("echo", json!({"msg": "x", "mode": "input"}));
        assert!(result.is_error());
        assert!(result.text().starts_with("Invalid input for echo:"));
        assert!(!result.text().contains("system error"));
    }

    #[test]
    fn handler_storage_error_asks_for_escalation() {
        let result = registry().call_tool("echo", json!({"msg": "x", "mode": "storage"}));
        assert!(result.is_error());
        let text = result.text();
        assert!(text.contains("disk I/O error"));
        assert!(text.contains("system error"));
        assert!(text.contains("Report this failure to the user"));
    }
}
