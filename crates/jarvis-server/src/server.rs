//! The context server facade.

use std::collections::BTreeMap;
use std::sync::Arc;

use jarvis_activity::ActivityLogger;
use jarvis_core::prompts::{GetPromptResult, PromptDescriptor};
use jarvis_core::tools::{ToolDefinition, ToolResult};
use jarvis_prompts::{PromptsChanged, TemplateCache, TemplateStore};
use jarvis_settings::{ConfigResolver, ConfigSource};
use jarvis_tools::{LogActivityTool, ToolRegistry};
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::errors::Result;
use crate::options::{DatabaseLocation, ServerOptions};

/// Config resolver, template store, activity logger and tool registry,
/// built once and shared by every request.
pub struct ContextServer {
    config: Arc<ConfigResolver>,
    prompts: TemplateStore,
    activities: Arc<ActivityLogger>,
    tools: ToolRegistry,
}

impl ContextServer {
    /// Build every component.
    ///
    /// An unusable config only logs a warning; an activity store that cannot
    /// be opened or migrated fails startup. A watcher that cannot start
    /// leaves hot reload off.
    pub fn open(options: ServerOptions) -> Result<Self> {
        let config = Arc::new(match options.resolved_config_path() {
            Some(path) => ConfigResolver::with_config_path(&options.project_dir, path),
            None => ConfigResolver::new(&options.project_dir),
        });
        if let ConfigSource::Defaulted { reason } = config.source() {
            warn!(path = %config.config_path().display(), %reason, "serving default project config");
        }

        let context_roots: Vec<_> = config
            .get_resolved_contexts()
            .into_iter()
            .map(|ctx| (ctx.name, ctx.root))
            .collect();
        let logger = match options.database_location() {
            DatabaseLocation::File(path) => ActivityLogger::open(&path, &options.project_dir)?,
            DatabaseLocation::InMemory => ActivityLogger::in_memory(&options.project_dir)?,
        };
        let activities = Arc::new(logger.with_context_roots(context_roots));

        let mut prompts = TemplateStore::new(Arc::clone(&config), Arc::new(TemplateCache::new()));
        if let Some(dir) = &options.builtin_prompts_dir {
            prompts = prompts.with_builtin_dir(Some(dir.clone()));
        }
        if let Some(dir) = options.resolved_project_prompts_dir() {
            prompts = prompts.with_project_dir(Some(dir));
        }
        if let Some(dir) = prompts.builtin_dir().filter(|dir| !dir.is_dir()) {
            warn!(dir = %dir.display(), "built-in template directory missing, set builtin_prompts_dir");
        }
        if options.watch {
            if let Err(e) = prompts.watch() {
                warn!(error = %e, "template watcher failed to start, hot reload disabled");
            }
        }

        let mut tools = ToolRegistry::new();
        tools.register(Arc::new(LogActivityTool::new(Arc::clone(&activities))))?;

        info!(
            project = %config.get_config().project.name,
            contexts = config.get_config().contexts.len(),
            tools = tools.len(),
            watching = prompts.is_watching(),
            "context server ready"
        );
        Ok(Self {
            config,
            prompts,
            activities,
            tools,
        })
    }

    /// Every discoverable prompt, sorted by name.
    pub fn list_prompts(&self) -> Vec<PromptDescriptor> {
        self.prompts.list_available_prompts()
    }

    /// Render a prompt.
    pub fn get_prompt(
        &self,
        name: &str,
        args: &BTreeMap<String, String>,
    ) -> jarvis_prompts::Result<GetPromptResult> {
        self.prompts.get_prompt_messages(name, args)
    }

    /// Every tool descriptor, sorted by name.
    pub fn list_tools(&self) -> Vec<ToolDefinition> {
        self.tools.definitions()
    }

    /// Invoke a tool. Failures come back as error results.
    pub fn call_tool(&self, name: &str, args: Value) -> ToolResult {
        self.tools.call_tool(name, args)
    }

    /// Notifications for template changes on disk (only when watching).
    pub fn subscribe_prompt_changes(&self) -> broadcast::Receiver<PromptsChanged> {
        self.prompts.subscribe()
    }

    /// The config resolver.
    pub fn config(&self) -> &ConfigResolver {
        &self.config
    }

    /// The template store.
    pub fn prompts(&self) -> &TemplateStore {
        &self.prompts
    }

    /// The activity logger, for audit and reporting reads.
    pub fn activities(&self) -> &ActivityLogger {
        &self.activities
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
