//! Memoized configuration access and per-context resolution.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::loader::{self, CONFIG_RELATIVE_PATH};
use crate::types::{Context, FeatureMap, GithubConfig, ProjectConfig, Stack};

/// Where the memoized configuration came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigSource {
    /// The document loaded cleanly.
    Loaded,
    /// The defaults were substituted.
    Defaulted {
        /// Display form of the underlying error.
        reason: String,
    },
}

/// A context with the shared block merged in.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedContext {
    /// Context name.
    pub name: String,
    /// Path as written in the document.
    pub path: String,
    /// Absolute root: the project directory joined with `path`.
    pub root: PathBuf,
    /// Technology stack.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<Stack>,
    /// Context override if present, else the project-level block.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github: Option<GithubConfig>,
    /// Shared tooling overlaid with the context's own keys.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_tooling: Option<FeatureMap>,
    /// Shared methodology overlaid with the context's own keys.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_methodology: Option<FeatureMap>,
}

impl ResolvedContext {
    fn resolve(project_dir: &Path, config: &ProjectConfig, context: &Context) -> Self {
        let shared = config.shared.as_ref();
        Self {
            name: context.name.clone(),
            path: context.path.clone(),
            root: path_clean::clean(project_dir.join(&context.path)),
            stack: context.stack.clone(),
            github: context.github.clone().or_else(|| config.github.clone()),
            resolved_tooling: overlay(
                shared.and_then(|s| s.tooling.as_ref()),
                context.tooling.as_ref(),
            ),
            resolved_methodology: overlay(
                shared.and_then(|s| s.methodology.as_ref()),
                context.methodology.as_ref(),
            ),
        }
    }
}

/// Single-level merge: context keys replace shared keys of the same name.
fn overlay(base: Option<&FeatureMap>, over: Option<&FeatureMap>) -> Option<FeatureMap> {
    match (base, over) {
        (None, None) => None,
        (base, over) => {
            let mut merged = base.cloned().unwrap_or_default();
            for (key, record) in over.into_iter().flatten() {
                let _ = merged.insert(key.clone(), record.clone());
            }
            Some(merged)
        }
    }
}

struct Memo {
    config: Arc<ProjectConfig>,
    source: ConfigSource,
}

/// Loads the project configuration once and serves resolved views of it.
pub struct ConfigResolver {
    project_dir: PathBuf,
    config_path: PathBuf,
    memo: Mutex<Option<Memo>>,
}

impl ConfigResolver {
    /// Resolver reading `<project_dir>/.jarvis/config.yaml`.
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        let project_dir = project_dir.into();
        let config_path = project_dir.join(CONFIG_RELATIVE_PATH);
        Self::with_config_path(project_dir, config_path)
    }

    /// Resolver reading an explicit config path.
    pub fn with_config_path(project_dir: impl Into<PathBuf>, config_path: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: project_dir.into(),
            config_path: config_path.into(),
            memo: Mutex::new(None),
        }
    }

    /// Project directory that context paths are relative to.
    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    /// Path of the YAML document.
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// The configuration, loading it on first access.
    pub fn get_config(&self) -> Arc<ProjectConfig> {
        let mut memo = self.memo.lock();
        Arc::clone(&memo.get_or_insert_with(|| self.load()).config)
    }

    /// Whether the memoized configuration was loaded or defaulted.
    pub fn source(&self) -> ConfigSource {
        let mut memo = self.memo.lock();
        memo.get_or_insert_with(|| self.load()).source.clone()
    }

    /// Forget the memoized configuration; the next access re-reads the file.
    pub fn invalidate(&self) {
        *self.memo.lock() = None;
        debug!(path = %self.config_path.display(), "config invalidated");
    }

    /// One resolved view per declared context, in declaration order.
    pub fn get_resolved_contexts(&self) -> Vec<ResolvedContext> {
        let config = self.get_config();
        config
            .contexts
            .iter()
            .map(|ctx| ResolvedContext::resolve(&self.project_dir, &config, ctx))
            .collect()
    }

    /// Absolute root of the named context.
    pub fn context_root(&self, name: &str) -> Option<PathBuf> {
        self.get_resolved_contexts()
            .into_iter()
            .find(|c| c.name == name)
            .map(|c| c.root)
    }

    /// Whether any context enables the feature at `dotted_path`.
    ///
    /// `tooling.<path>` and `methodology.<path>` search one tree; any other
    /// path searches both. The leaf must be an object with `enabled: true`.
    pub fn is_feature_enabled(&self, dotted_path: &str) -> bool {
        let (trees, rest): (&[Tree], &str) = if let Some(rest) = dotted_path.strip_prefix("tooling.") {
            (&[Tree::Tooling], rest)
        } else if let Some(rest) = dotted_path.strip_prefix("methodology.") {
            (&[Tree::Methodology], rest)
        } else {
            (&[Tree::Tooling, Tree::Methodology], dotted_path)
        };
        if rest.is_empty() {
            return false;
        }
        let segments: Vec<&str> = rest.split('.').collect();

        self.get_resolved_contexts().iter().any(|ctx| {
            trees.iter().any(|tree| {
                let map = match tree {
                    Tree::Tooling => ctx.resolved_tooling.as_ref(),
                    Tree::Methodology => ctx.resolved_methodology.as_ref(),
                };
                map.and_then(|m| serde_json::to_value(m).ok())
                    .is_some_and(|v| leaf_enabled(&v, &segments))
            })
        })
    }

    fn load(&self) -> Memo {
        match loader::load(&self.config_path) {
            Ok(config) => Memo {
                config: Arc::new(config),
                source: ConfigSource::Loaded,
            },
            Err(defaulted) => Memo {
                config: Arc::new(defaulted.config),
                source: ConfigSource::Defaulted {
                    reason: defaulted.reason.to_string(),
                },
            },
        }
    }
}

#[derive(Clone, Copy)]
enum Tree {
    Tooling,
    Methodology,
}

fn leaf_enabled(tree: &Value, segments: &[&str]) -> bool {
    let mut node = tree;
    for segment in segments {
        match node.get(segment) {
            Some(next) => node = next,
            None => return false,
        }
    }
    node.get("enabled") == Some(&Value::Bool(true))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
