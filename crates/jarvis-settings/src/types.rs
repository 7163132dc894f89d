//! Typed configuration document.
//!
//! Each entity has a closed set of known fields plus an `extra` bag that
//! captures any project-specific keys, so unknown YAML survives a load and
//! is still visible to templates.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Per-feature records keyed by feature name (e.g. `linting`, `tdd`).
pub type FeatureMap = BTreeMap<String, FeatureRecord>;

/// Root configuration document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    /// Project metadata.
    pub project: ProjectInfo,
    /// Sub-project roots. Never empty once loaded.
    pub contexts: Vec<Context>,
    /// Tooling/methodology inherited by every context.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared: Option<SharedSettings>,
    /// Project-level GitHub coordinates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<GithubConfig>,
    /// Opt-in behaviors.
    #[serde(default)]
    pub features: Features,
    /// Unknown top-level keys.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            project: ProjectInfo::default(),
            contexts: vec![Context::main()],
            shared: None,
            github: None,
            features: Features::default(),
            extra: Map::new(),
        }
    }
}

impl ProjectConfig {
    /// Look up a context by name.
    pub fn context(&self, name: &str) -> Option<&Context> {
        self.contexts.iter().find(|c| c.name == name)
    }
}

/// Project metadata.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInfo {
    /// Project name.
    pub name: String,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Project kind (`web-app`, `library`, ...).
    #[serde(default, rename = "type")]
    pub project_type: String,
    /// Risk level from 1 (low) to 10 (high).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<u8>,
    /// Unknown keys.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for ProjectInfo {
    fn default() -> Self {
        Self {
            name: "project".into(),
            description: String::new(),
            project_type: String::new(),
            risk_level: None,
            extra: Map::new(),
        }
    }
}

/// Technology stack of a context: a single label or a list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Stack {
    /// One label, e.g. `rust`.
    Name(String),
    /// Several labels.
    List(Vec<String>),
}

/// A named sub-project root.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Context {
    /// Unique name within the document.
    pub name: String,
    /// Root for file operations, relative to the project directory.
    pub path: String,
    /// Technology stack.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<Stack>,
    /// Context-specific tooling records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tooling: Option<FeatureMap>,
    /// Context-specific methodology records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub methodology: Option<FeatureMap>,
    /// GitHub override for this context.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<GithubConfig>,
    /// Unknown keys.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Context {
    /// The built-in context used when no valid document exists.
    pub fn main() -> Self {
        Self {
            name: "main".into(),
            path: ".".into(),
            stack: None,
            tooling: None,
            methodology: None,
            github: None,
            extra: Map::new(),
        }
    }
}

/// One tooling or methodology entry.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureRecord {
    /// Whether the feature is on.
    pub enabled: bool,
    /// Command used to run the feature, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    /// Tool-specific keys, including nested feature records.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Settings applied as the base for every context.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SharedSettings {
    /// Shared tooling records.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooling: Option<FeatureMap>,
    /// Shared methodology records.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub methodology: Option<FeatureMap>,
    /// Unknown keys.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// GitHub repository coordinates.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GithubConfig {
    /// Owner or organization.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    /// Repository name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
    /// Branch that pull requests target.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_branch: Option<String>,
    /// Unknown keys.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Opt-in behaviors.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Features {
    /// Workflow automation.
    pub workflow: WorkflowFeatures,
    /// Unknown feature groups.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Workflow automation flags.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkflowFeatures {
    /// Commit automatically after a completed task (default: true).
    pub auto_commit: bool,
    /// Unknown flags.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for WorkflowFeatures {
    fn default() -> Self {
        Self {
            auto_commit: true,
            extra: Map::new(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
