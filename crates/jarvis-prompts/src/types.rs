//! Template files, index entries and compiled templates.

use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

use jarvis_core::prompts::{PromptArgument, PromptDescriptor};
use serde::Deserialize;

/// Which directory a template was discovered in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TemplateSource {
    /// Shipped with the crate.
    Builtin,
    /// Project `.jarvis/prompts` directory.
    Project,
}

impl fmt::Display for TemplateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Builtin => f.write_str("builtin"),
            Self::Project => f.write_str("project"),
        }
    }
}

/// A prompt file as written on disk.
#[derive(Clone, Debug, Deserialize)]
pub struct PromptFile {
    /// Prompt name; the file stem when omitted.
    #[serde(default)]
    pub name: Option<String>,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Declared arguments.
    #[serde(default)]
    pub arguments: Vec<PromptArgument>,
    /// Handlebars body.
    #[serde(default)]
    pub template: Option<String>,
}

/// Header-only view of a prompt file; the body is never looked at.
#[derive(Debug, Deserialize)]
pub(crate) struct PromptHeader {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub arguments: Vec<PromptArgument>,
}

/// An indexed, not yet compiled prompt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexEntry {
    /// Listing metadata.
    pub descriptor: PromptDescriptor,
    /// Backing file.
    pub path: PathBuf,
    /// Where it was found.
    pub source: TemplateSource,
}

/// A parsed Handlebars body plus the arguments it requires.
#[derive(Clone, Debug)]
pub struct CompiledTemplate {
    /// Prompt name.
    pub name: String,
    /// Prompt description.
    pub description: String,
    /// Parsed syntax tree.
    pub template: handlebars::Template,
    /// Arguments that must be supplied to render.
    pub required_args: BTreeSet<String>,
}

/// Broadcast when a template file changes on disk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PromptsChanged {
    /// File that triggered the notification.
    pub path: PathBuf,
}
