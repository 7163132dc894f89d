//! Prompt listing and rendering.
//!
//! [`TemplateStore`] owns three lazily built pieces of state: the metadata
//! index, the Handlebars registry (helpers plus partials) and, through the
//! injected [`TemplateCache`], compiled prompt bodies. [`TemplateStore::clear_cache`]
//! drops all of them. With watching enabled, any queued template change
//! clears them before the next operation runs.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use handlebars::Handlebars;
use jarvis_core::prompts::{GetPromptResult, PromptDescriptor, PromptMessage};
use jarvis_settings::ConfigResolver;
use parking_lot::Mutex;
use serde_json::json;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::cache::TemplateCache;
use crate::errors::{PromptError, Result};
use crate::helpers;
use crate::loader::TemplateIndex;
use crate::types::{CompiledTemplate, PromptsChanged};
use crate::watcher::TemplateWatcher;
use crate::{BUILTIN_TEMPLATES_DIR, PROJECT_TEMPLATES_RELATIVE_PATH};

const NOTIFY_CAPACITY: usize = 64;

/// Indexes, compiles, caches and renders prompt templates.
pub struct TemplateStore {
    config: Arc<ConfigResolver>,
    cache: Arc<TemplateCache<CompiledTemplate>>,
    builtin_dir: Option<PathBuf>,
    project_dir: Option<PathBuf>,
    index: Mutex<Option<Arc<TemplateIndex>>>,
    registry: Mutex<Option<Handlebars<'static>>>,
    watcher: Option<TemplateWatcher>,
    changes: broadcast::Sender<PromptsChanged>,
}

impl TemplateStore {
    /// Store reading the shipped templates and `<project>/.jarvis/prompts`.
    pub fn new(config: Arc<ConfigResolver>, cache: Arc<TemplateCache<CompiledTemplate>>) -> Self {
        let project_dir = config.project_dir().join(PROJECT_TEMPLATES_RELATIVE_PATH);
        let (changes, _) = broadcast::channel(NOTIFY_CAPACITY);
        Self {
            config,
            cache,
            builtin_dir: Some(PathBuf::from(BUILTIN_TEMPLATES_DIR)),
            project_dir: Some(project_dir),
            index: Mutex::new(None),
            registry: Mutex::new(None),
            watcher: None,
            changes,
        }
    }

    /// Replace the built-in directory; `None` disables built-ins.
    #[must_use]
    pub fn with_builtin_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.builtin_dir = dir;
        self
    }

    /// Replace the project directory; `None` disables project templates.
    #[must_use]
    pub fn with_project_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.project_dir = dir;
        self
    }

    /// Built-in template directory.
    pub fn builtin_dir(&self) -> Option<&Path> {
        self.builtin_dir.as_deref()
    }

    /// Project template directory.
    pub fn project_dir(&self) -> Option<&Path> {
        self.project_dir.as_deref()
    }

    /// Start watching both directories for changes.
    pub fn watch(&mut self) -> Result<()> {
        let dirs: Vec<PathBuf> = self
            .builtin_dir
            .iter()
            .chain(self.project_dir.iter())
            .cloned()
            .collect();
        self.watcher = Some(TemplateWatcher::start(&dirs, self.changes.clone())?);
        info!(dirs = dirs.len(), "template hot reload enabled");
        Ok(())
    }

    /// Whether a watcher is running.
    pub fn is_watching(&self) -> bool {
        self.watcher.is_some()
    }

    /// Receive a notification for every template change on disk.
    pub fn subscribe(&self) -> broadcast::Receiver<PromptsChanged> {
        self.changes.subscribe()
    }

    /// Metadata for every discoverable prompt, sorted by name.
    pub fn list_available_prompts(&self) -> Vec<PromptDescriptor> {
        self.sync_with_disk();
        self.index().descriptors()
    }

    /// Render `name` with `args` into a single user message.
    pub fn get_prompt_messages(
        &self,
        name: &str,
        args: &BTreeMap<String, String>,
    ) -> Result<GetPromptResult> {
        self.sync_with_disk();
        let index = self.index();
        let entry = index
            .prompts
            .get(name)
            .ok_or_else(|| PromptError::UnknownPrompt(name.to_owned()))?;

        if let Some(missing) = entry
            .descriptor
            .required_arguments()
            .find(|arg| !args.contains_key(*arg))
        {
            return Err(PromptError::MissingArgument {
                prompt: name.to_owned(),
                argument: missing.to_owned(),
            });
        }

        let compiled = self
            .cache
            .get_or_try_insert_with(name, || crate::loader::compile(entry))?;
        let body = self.render(&index, &compiled, args)?;

        let text = match index.constitution.as_deref().map(str::trim) {
            Some(constitution) if !constitution.is_empty() => {
                format!("{constitution}\n\n{}", body.trim())
            }
            _ => body.trim().to_owned(),
        };
        debug!(name, source = %entry.source, "rendered prompt");

        Ok(GetPromptResult {
            description: Some(compiled.description.clone()),
            messages: vec![PromptMessage::user_text(text)],
        })
    }

    /// Drop compiled templates, the index, registered partials and the
    /// constitution.
    pub fn clear_cache(&self) {
        let evicted = self.cache.invalidate_all();
        *self.index.lock() = None;
        *self.registry.lock() = None;
        debug!(evicted, "template caches cleared");
    }

    fn sync_with_disk(&self) {
        let Some(watcher) = &self.watcher else {
            return;
        };
        let changed = watcher.drain();
        if let Some(first) = changed.first() {
            debug!(count = changed.len(), path = %first.display(), "template files changed");
            self.clear_cache();
        }
    }

    fn index(&self) -> Arc<TemplateIndex> {
        let mut index = self.index.lock();
        Arc::clone(index.get_or_insert_with(|| {
            Arc::new(TemplateIndex::build(
                self.builtin_dir.as_deref(),
                self.project_dir.as_deref(),
            ))
        }))
    }

    fn render(
        &self,
        index: &TemplateIndex,
        compiled: &CompiledTemplate,
        args: &BTreeMap<String, String>,
    ) -> Result<String> {
        let config = self.config.get_config();
        let data = json!({
            "args": args,
            "config": &*config,
            "project": &config.project,
            "contexts": self.config.get_resolved_contexts(),
            "features": &config.features,
            "constitution": index.constitution.as_deref().unwrap_or_default(),
        });

        let mut guard = self.registry.lock();
        let registry = guard.get_or_insert_with(|| build_registry(index));
        let key = format!("prompt/{}", compiled.name);
        registry.register_template(&key, compiled.template.clone());
        registry
            .render(&key, &data)
            .map_err(|e| PromptError::Render {
                name: compiled.name.clone(),
                message: e.to_string(),
            })
    }
}

fn build_registry(index: &TemplateIndex) -> Handlebars<'static> {
    let mut registry = helpers::new_registry();
    for (name, path) in &index.partials {
        let source = match std::fs::read_to_string(path) {
            Ok(source) => source,
            Err(e) => {
                warn!(partial = %name, path = %path.display(), error = %e, "failed to read partial");
                continue;
            }
        };
        if let Err(e) = registry.register_partial(name, source) {
            warn!(partial = %name, path = %path.display(), error = %e, "invalid partial, skipped");
        }
    }
    debug!(partials = index.partials.len(), "template registry built");
    registry
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    struct Fixture {
        project: TempDir,
        builtin: TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            let fixture = Self {
                project: TempDir::new().unwrap(),
                builtin: TempDir::new().unwrap(),
            };
            fixture.builtin_file("constitution.md", "Follow the house rules.\n");
            fixture.builtin_file(
                "greet.yaml",
                "description: Greets someone\narguments:\n  - name: who\n    required: true\n  - name: mood\ntemplate: |\n  Hello {{args.who}} from {{project.name}}{{#if args.mood}} ({{args.mood}}){{/if}}\n",
            );
            fixture
        }

        fn builtin_file(&self, rel: &str, content: &str) {
            write(self.builtin.path(), rel, content);
        }

        fn project_file(&self, rel: &str, content: &str) {
            write(&self.project_prompts(), rel, content);
        }

        fn project_prompts(&self) -> PathBuf {
            self.project.path().join(PROJECT_TEMPLATES_RELATIVE_PATH)
        }

        fn config(&self, yaml: &str) {
            write(self.project.path(), ".jarvis/config.yaml", yaml);
        }

        fn store(&self) -> TemplateStore {
            let resolver = Arc::new(ConfigResolver::new(self.project.path()));
            TemplateStore::new(resolver, Arc::new(TemplateCache::new()))
                .with_builtin_dir(Some(self.builtin.path().to_path_buf()))
        }
    }

    fn write(dir: &Path, rel: &str, content: &str) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn args(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn new_defaults_to_shipped_and_project_dirs() {
        let tmp = TempDir::new().unwrap();
        let store = TemplateStore::new(
            Arc::new(ConfigResolver::new(tmp.path())),
            Arc::new(TemplateCache::new()),
        );
        assert_eq!(store.builtin_dir(), Some(Path::new(BUILTIN_TEMPLATES_DIR)));
        assert_eq!(
            store.project_dir(),
            Some(tmp.path().join(".jarvis/prompts").as_path())
        );
    }

    #[test]
    fn renders_with_constitution_first() {
        let fx = Fixture::new();
        fx.config("project:\n  name: demo\ncontexts:\n  - name: main\n    path: .\n");
        let result = fx
            .store()
            .get_prompt_messages("greet", &args(&[("who", "Ada")]))
            .unwrap();

        assert_eq!(result.description.as_deref(), Some("Greets someone"));
        assert_eq!(result.messages.len(), 1);
        assert_eq!(
            result.messages[0].text(),
            "Follow the house rules.\n\nHello Ada from demo"
        );
    }

    #[test]
    fn optional_argument_renders_when_present() {
        let fx = Fixture::new();
        let result = fx
            .store()
            .get_prompt_messages("greet", &args(&[("who", "Ada"), ("mood", "cheerful")]))
            .unwrap();
        assert!(result.messages[0].text().ends_with("Hello Ada from project (cheerful)"));
    }

    #[test]
    fn unknown_prompt() {
        let fx = Fixture::new();
        assert_matches!(
            fx.store().get_prompt_messages("nope", &BTreeMap::new()),
            Err(PromptError::UnknownPrompt(name)) if name == "nope"
        );
    }

    #[test]
    fn missing_required_argument() {
        let fx = Fixture::new();
        assert_matches!(
            fx.store().get_prompt_messages("greet", &args(&[("mood", "x")])),
            Err(PromptError::MissingArgument { argument, .. }) if argument == "who"
        );
    }

    #[test]
    fn list_is_sorted_and_uncompiled() {
        let fx = Fixture::new();
        fx.builtin_file("broken-body.yaml", "description: later\ntemplate: \"{{#if}}\"\n");
        fx.builtin_file("alpha.yaml", "template: a\n");
        let store = fx.store();
        let names: Vec<_> = store
            .list_available_prompts()
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(names, vec!["alpha", "broken-body", "greet"]);
        assert!(store.cache.is_empty());
        assert_matches!(
            store.get_prompt_messages("broken-body", &BTreeMap::new()),
            Err(PromptError::Compile { .. })
        );
    }

    #[test]
    fn project_prompt_shadows_builtin() {
        let fx = Fixture::new();
        fx.project_file("greet.yaml", "description: Project greet\ntemplate: Yo {{args.who}}\n");
        fx.project_file("constitution.md", "Project rules.");
        let result = fx
            .store()
            .get_prompt_messages("greet", &args(&[("who", "Bo")]))
            .unwrap();
        assert_eq!(result.messages[0].text(), "Project rules.\n\nYo Bo");
        assert_eq!(result.description.as_deref(), Some("Project greet"));
    }

    #[test]
    fn partials_and_contexts_render() {
        let fx = Fixture::new();
        fx.config(
            "project:\n  name: demo\ncontexts:\n  - name: api\n    path: services/api\n    stack: [rust, sqlite]\n  - name: web\n    path: web\n    stack: typescript\n",
        );
        fx.builtin_file(
            "partials/ctx.hbs",
            "{{#each contexts}}{{name}}={{path}}{{#if (includes stack \"rust\")}}!{{/if}};{{/each}}",
        );
        fx.builtin_file("ctx.yaml", "template: \"{{> ctx}}\"\n");
        let result = fx.store().get_prompt_messages("ctx", &BTreeMap::new()).unwrap();
        assert!(result.messages[0].text().ends_with("api=services/api!;web=web;"));
    }

    #[test]
    fn feature_and_config_values_visible() {
        let fx = Fixture::new();
        fx.config("project:\n  name: demo\n  team: core\ncontexts:\n  - name: main\n    path: .\n");
        fx.builtin_file(
            "flags.yaml",
            "template: \"{{#if features.workflow.autoCommit}}auto{{/if}} {{config.project.team}}\"\n",
        );
        let result = fx.store().get_prompt_messages("flags", &BTreeMap::new()).unwrap();
        assert!(result.messages[0].text().ends_with("auto core"));
    }

    #[test]
    fn unknown_helper_and_partial_fail_render() {
        let fx = Fixture::new();
        fx.builtin_file("helper.yaml", "template: \"{{shout args.x}}\"\n");
        fx.builtin_file("partial.yaml", "template: \"{{> missing-partial}}\"\n");
        let store = fx.store();
        assert_matches!(
            store.get_prompt_messages("helper", &BTreeMap::new()),
            Err(PromptError::Render { message, .. }) if message.contains("shout")
        );
        assert_matches!(
            store.get_prompt_messages("partial", &BTreeMap::new()),
            Err(PromptError::Render { message, .. }) if message.contains("missing-partial")
        );
    }

    #[test]
    fn compiled_templates_are_cached_until_cleared() {
        let fx = Fixture::new();
        let store = fx.store();
        let who = args(&[("who", "A")]);
        let _ = store.get_prompt_messages("greet", &who).unwrap();
        assert_eq!(store.cache.len(), 1);

        // without a watcher, edits are invisible until an explicit clear
        fx.builtin_file("greet.yaml", "template: Changed\n");
        let stale = store.get_prompt_messages("greet", &who).unwrap();
        assert!(stale.messages[0].text().contains("Hello A"));

        store.clear_cache();
        assert!(store.cache.is_empty());
        let fresh = store.get_prompt_messages("greet", &who).unwrap();
        assert!(fresh.messages[0].text().ends_with("Changed"));
    }

    #[test]
    fn hot_reload_picks_up_edits() {
        let fx = Fixture::new();
        let mut store = fx.store();
        store.watch().unwrap();
        let mut notifications = store.subscribe();
        let who = args(&[("who", "A")]);
        let before = store.get_prompt_messages("greet", &who).unwrap();
        assert!(before.messages[0].text().contains("Hello A"));

        fx.builtin_file("greet.yaml", "template: Reloaded {{args.who}}\n");

        let mut reloaded = false;
        for _ in 0..50 {
            let text = store
                .get_prompt_messages("greet", &who)
                .map(|r| r.messages[0].text().to_owned())
                .unwrap_or_default();
            if text.ends_with("Reloaded A") {
                reloaded = true;
                break;
            }
            std::thread::sleep(Duration::from_millis(100));
        }
        assert!(reloaded);
        assert!(notifications.try_recv().is_ok());
    }

    #[test]
    fn project_dir_created_after_watch_is_picked_up() {
        let fx = Fixture::new();
        assert!(!fx.project_prompts().exists());
        let mut store = fx.store();
        store.watch().unwrap();
        let who = args(&[("who", "A")]);
        let before = store.get_prompt_messages("greet", &who).unwrap();
        assert!(before.messages[0].text().contains("Hello A"));

        fx.project_file("greet.yaml", "template: project\n");
        let after = store.get_prompt_messages("greet", &who).unwrap();
        assert!(after.messages[0].text().ends_with("project"));

        fx.project_file("greet.yaml", "template: edited\n");
        let mut reloaded = false;
        for _ in 0..50 {
            let text = store
                .get_prompt_messages("greet", &who)
                .map(|r| r.messages[0].text().to_owned())
                .unwrap_or_default();
            if text.ends_with("edited") {
                reloaded = true;
                break;
            }
            std::thread::sleep(Duration::from_millis(100));
        }
        assert!(reloaded);
    }

    #[test]
    fn clear_drops_constitution() {
        let fx = Fixture::new();
        let store = fx.store();
        let who = args(&[("who", "A")]);
        let _ = store.get_prompt_messages("greet", &who).unwrap();
        fx.builtin_file("constitution.md", "New rules.");
        store.clear_cache();
        let result = store.get_prompt_messages("greet", &who).unwrap();
        assert!(result.messages[0].text().starts_with("New rules.\n\n"));
    }

    #[test]
    fn shipped_templates_render() {
        let fx = Fixture::new();
        fx.config(
            "project:\n  name: demo\n  type: service\n  riskLevel: 8\ncontexts:\n  - name: api\n    path: api\n    stack: [rust]\n    tooling:\n      linting:\n        enabled: true\n        command: cargo clippy\n  - name: web\n    path: web\n    stack: typescript\n",
        );
        let store = TemplateStore::new(
            Arc::new(ConfigResolver::new(fx.project.path())),
            Arc::new(TemplateCache::new()),
        );
        let names: Vec<_> = store
            .list_available_prompts()
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(
            names,
            vec!["log-work", "plan-feature", "review-changes", "start-session"]
        );

        let start = store.get_prompt_messages("start-session", &BTreeMap::new()).unwrap();
        let text = start.messages[0].text();
        assert!(text.starts_with("# Working agreement"));
        assert!(text.contains("demo"));
        assert!(text.contains("`api` at `api` [rust]"));
        assert!(text.contains("`web` at `web` [typescript]"));
        assert!(text.contains("cargo clippy"));
        assert!(text.contains("Commit after each completed step."));

        let plan = store
            .get_prompt_messages("plan-feature", &args(&[("feature", "dark mode")]))
            .unwrap();
        assert!(plan.messages[0].text().contains("dark mode"));

        let review = store
            .get_prompt_messages("review-changes", &args(&[("scope", "src/")]))
            .unwrap();
        assert!(review.messages[0].text().contains("`src/`"));

        let log = store
            .get_prompt_messages("log-work", &args(&[("summary", "Fixed login")]))
            .unwrap();
        let text = log.messages[0].text();
        assert!(text.contains("activity: Fixed login"));
        assert!(text.contains("(api, web)"));

        assert_matches!(
            store.get_prompt_messages("plan-feature", &BTreeMap::new()),
            Err(PromptError::MissingArgument { argument, .. }) if argument == "feature"
        );
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        const ARGS: [&str; 3] = ["alpha", "beta", "gamma"];

        fn fixture() -> Fixture {
            let fx = Fixture::new();
            fx.builtin_file(
                "three.yaml",
                "arguments:\n  - name: alpha\n    required: true\n  - name: beta\n    required: true\n  - name: gamma\n    required: true\ntemplate: \"{{args.alpha}}{{args.beta}}{{args.gamma}}\"\n",
            );
            fx
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(32))]

            #[test]
            fn all_required_present_never_missing(values in prop::collection::vec("[a-z]{0,6}", 3)) {
                let fx = fixture();
                let map: BTreeMap<String, String> = ARGS
                    .iter()
                    .zip(&values)
                    .map(|(k, v)| ((*k).to_owned(), v.clone()))
                    .collect();
                let result = fx.store().get_prompt_messages("three", &map);
                prop_assert!(result.is_ok());
            }

            #[test]
            fn omitting_any_required_is_missing(omit in 0usize..3) {
                let fx = fixture();
                let map: BTreeMap<String, String> = ARGS
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| *i != omit)
                    .map(|(_, k)| ((*k).to_owned(), "v".to_owned()))
                    .collect();
                let missing = matches!(
                    fx.store().get_prompt_messages("three", &map),
                    Err(PromptError::MissingArgument { ref argument, .. }) if argument == ARGS[omit]
                );
                prop_assert!(missing);
            }
        }
    }
}
