//! Template directory scanner.
//!
//! A source directory holds:
//! - `*.yaml` / `*.yml` prompt files, at any depth outside `partials/`
//! - `partials/**/*.hbs` and `partials/**/*.md`, named by their path
//!   relative to `partials/` without the extension
//! - an optional `constitution.md` at the root
//!
//! Scanning reads prompt headers only; bodies are compiled on first render.
//! Missing directories scan as empty.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use jarvis_core::prompts::PromptDescriptor;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::errors::{PromptError, Result};
use crate::types::{CompiledTemplate, IndexEntry, PromptFile, PromptHeader, TemplateSource};

const PARTIALS_DIR: &str = "partials";
const CONSTITUTION_FILE: &str = "constitution.md";

/// Extensions whose changes invalidate the store.
pub const WATCHED_EXTENSIONS: &[&str] = &["yaml", "yml", "hbs", "md"];

/// A file that could not be indexed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScanError {
    /// Offending file.
    pub path: PathBuf,
    /// What was wrong.
    pub message: String,
}

/// Everything found in one source directory.
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Indexed prompts.
    pub prompts: Vec<IndexEntry>,
    /// Partial name to file.
    pub partials: BTreeMap<String, PathBuf>,
    /// Root `constitution.md`, if present.
    pub constitution: Option<PathBuf>,
    /// Files that failed to index.
    pub errors: Vec<ScanError>,
}

/// Scan one source directory.
pub fn scan_directory(dir: &Path, source: TemplateSource) -> ScanResult {
    let mut result = ScanResult::default();
    if !dir.is_dir() {
        return result;
    }

    for entry in WalkDir::new(dir).follow_links(true).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "failed to walk template directory");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let Ok(rel) = path.strip_prefix(dir) else {
            continue;
        };
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();

        if let Ok(partial_rel) = rel.strip_prefix(PARTIALS_DIR) {
            if matches!(ext, "hbs" | "md") {
                let name = partial_name(partial_rel);
                let _ = result.partials.insert(name, path.to_path_buf());
            }
            continue;
        }
        if rel == Path::new(CONSTITUTION_FILE) {
            result.constitution = Some(path.to_path_buf());
            continue;
        }
        if matches!(ext, "yaml" | "yml") {
            match index_prompt(path, source) {
                Ok(entry) => {
                    debug!(name = %entry.descriptor.name, %source, "indexed prompt");
                    result.prompts.push(entry);
                }
                Err(error) => result.errors.push(error),
            }
        }
    }
    result
}

fn partial_name(rel: &Path) -> String {
    rel.with_extension("")
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn index_prompt(path: &Path, source: TemplateSource) -> std::result::Result<IndexEntry, ScanError> {
    let content = std::fs::read_to_string(path).map_err(|e| ScanError {
        path: path.to_path_buf(),
        message: format!("failed to read file: {e}"),
    })?;
    let header: PromptHeader = serde_yaml::from_str(&content).map_err(|e| ScanError {
        path: path.to_path_buf(),
        message: format!("invalid YAML: {e}"),
    })?;
    let name = header
        .name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| file_stem(path));

    Ok(IndexEntry {
        descriptor: PromptDescriptor {
            name,
            description: header.description,
            arguments: header.arguments,
        },
        path: path.to_path_buf(),
        source,
    })
}

/// Merged view of the built-in and project sources.
#[derive(Debug, Default)]
pub struct TemplateIndex {
    /// Prompt name to entry; project entries shadow built-ins.
    pub prompts: HashMap<String, IndexEntry>,
    /// Partial name to file; project partials shadow built-ins.
    pub partials: BTreeMap<String, PathBuf>,
    /// Constitution text, project first.
    pub constitution: Option<String>,
}

impl TemplateIndex {
    /// Scan both sources and merge them.
    pub fn build(builtin_dir: Option<&Path>, project_dir: Option<&Path>) -> Self {
        let project = project_dir
            .map(|d| scan_directory(d, TemplateSource::Project))
            .unwrap_or_default();
        let builtin = builtin_dir
            .map(|d| scan_directory(d, TemplateSource::Builtin))
            .unwrap_or_default();

        let mut index = Self::default();
        for entry in project.prompts {
            if let Some(previous) = index.prompts.get(&entry.descriptor.name) {
                warn!(
                    name = %entry.descriptor.name,
                    kept = %previous.path.display(),
                    ignored = %entry.path.display(),
                    "duplicate project prompt name"
                );
                continue;
            }
            let _ = index.prompts.insert(entry.descriptor.name.clone(), entry);
        }
        for entry in builtin.prompts {
            if index.prompts.contains_key(&entry.descriptor.name) {
                debug!(name = %entry.descriptor.name, "built-in prompt shadowed by project prompt");
            } else {
                let _ = index.prompts.insert(entry.descriptor.name.clone(), entry);
            }
        }

        index.partials = builtin.partials;
        index.partials.extend(project.partials);

        index.constitution = project
            .constitution
            .or(builtin.constitution)
            .and_then(|path| match std::fs::read_to_string(&path) {
                Ok(text) => Some(text),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to read constitution");
                    None
                }
            });

        for error in project.errors.iter().chain(&builtin.errors) {
            warn!(path = %error.path.display(), message = %error.message, "invalid template file");
        }
        debug!(
            prompts = index.prompts.len(),
            partials = index.partials.len(),
            "template index built"
        );
        index
    }

    /// Descriptors sorted by name.
    pub fn descriptors(&self) -> Vec<PromptDescriptor> {
        let mut out: Vec<PromptDescriptor> =
            self.prompts.values().map(|e| e.descriptor.clone()).collect();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        out
    }
}

/// Read and compile the body of an indexed prompt.
pub fn compile(entry: &IndexEntry) -> Result<CompiledTemplate> {
    let content = std::fs::read_to_string(&entry.path)?;
    let file: PromptFile = serde_yaml::from_str(&content).map_err(|e| PromptError::Parse {
        path: entry.path.clone(),
        message: e.to_string(),
    })?;
    let name = entry.descriptor.name.clone();
    let body = file.template.ok_or_else(|| PromptError::Parse {
        path: entry.path.clone(),
        message: "missing `template`".into(),
    })?;
    let template = handlebars::Template::compile(&body).map_err(|e| PromptError::Compile {
        name: name.clone(),
        message: e.to_string(),
    })?;
    debug!(name = %name, path = %entry.path.display(), "compiled prompt");

    Ok(CompiledTemplate {
        required_args: file
            .arguments
            .iter()
            .filter(|a| a.required)
            .map(|a| a.name.clone())
            .collect(),
        name,
        description: file.description,
        template,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
