//! Configuration loading with shape checks and default fallback.
//!
//! Loading flow:
//! 1. Read `.jarvis/config.yaml` and parse it into a JSON value
//! 2. Check the minimal shape (`project.name`, non-empty `contexts` with
//!    unique `name`/`path` entries) and drop an out-of-range `riskLevel`
//! 3. Drop individual leaves whose type does not fit the schema (a string
//!    `enabled`, a scalar where a feature record belongs), warning for each
//! 4. Deep-merge the document over the serialized [`ProjectConfig::default`]
//! 5. Deserialize into the typed schema
//!
//! Only a missing file, unparsable YAML or a failed shape check yields the
//! defaults wrapped in [`Defaulted`]. Bad leaves never discard the document.
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::collections::HashSet;
use std::path::Path;

use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::errors::{Result, SettingsError};
use crate::types::ProjectConfig;

/// Location of the configuration document relative to the project directory.
pub const CONFIG_RELATIVE_PATH: &str = ".jarvis/config.yaml";

/// A load that fell back to the built-in defaults.
#[derive(Debug)]
pub struct Defaulted {
    /// The default configuration handed to callers instead.
    pub config: ProjectConfig,
    /// Why the document could not be used.
    pub reason: SettingsError,
}

impl Defaulted {
    fn new(reason: SettingsError) -> Self {
        Self {
            config: ProjectConfig::default(),
            reason,
        }
    }
}

/// Load the configuration at `path`.
///
/// `Ok` means the document was used; `Err` carries the defaults and the
/// reason they were substituted. Both arms hold a usable configuration.
pub fn load(path: &Path) -> std::result::Result<ProjectConfig, Defaulted> {
    match try_load(path) {
        Ok(config) => {
            debug!(
                path = %path.display(),
                project = %config.project.name,
                contexts = config.contexts.len(),
                "loaded project config"
            );
            Ok(config)
        }
        Err(SettingsError::NotFound(p)) => {
            info!(path = %p.display(), "no project config found, using defaults");
            Err(Defaulted::new(SettingsError::NotFound(p)))
        }
        Err(reason) => {
            warn!(path = %path.display(), error = %reason, "invalid project config, using defaults");
            Err(Defaulted::new(reason))
        }
    }
}

/// Load the configuration at `path`, discarding the defaulted/loaded distinction.
pub fn load_or_default(path: &Path) -> ProjectConfig {
    load(path).unwrap_or_else(|d| d.config)
}

fn try_load(path: &Path) -> Result<ProjectConfig> {
    if !path.exists() {
        return Err(SettingsError::NotFound(path.to_path_buf()));
    }
    let content = std::fs::read_to_string(path)?;
    let mut document: Value = serde_yaml::from_str(&content)?;

    check_shape(&document)?;
    sanitize_risk_level(&mut document);
    sanitize_leaves(&mut document);

    let defaults = serde_json::to_value(ProjectConfig::default())?;
    let merged = deep_merge(defaults, document);
    Ok(serde_json::from_value(merged)?)
}

/// Minimal structural checks on the raw document.
fn check_shape(document: &Value) -> Result<()> {
    let root = document
        .as_object()
        .ok_or_else(|| SettingsError::InvalidShape("document root must be a mapping".into()))?;

    let has_name = root
        .get("project")
        .and_then(|p| p.get("name"))
        .is_some_and(Value::is_string);
    if !has_name {
        return Err(SettingsError::InvalidShape(
            "project.name must be a string".into(),
        ));
    }

    let contexts = root
        .get("contexts")
        .and_then(Value::as_array)
        .ok_or_else(|| SettingsError::InvalidShape("contexts must be a list".into()))?;
    if contexts.is_empty() {
        return Err(SettingsError::InvalidShape(
            "contexts must have at least one entry".into(),
        ));
    }

    let mut seen = HashSet::new();
    for (i, ctx) in contexts.iter().enumerate() {
        let name = ctx.get("name").and_then(Value::as_str).ok_or_else(|| {
            SettingsError::InvalidShape(format!("contexts[{i}].name must be a string"))
        })?;
        if !ctx.get("path").is_some_and(Value::is_string) {
            return Err(SettingsError::InvalidShape(format!(
                "contexts[{i}].path must be a string"
            )));
        }
        if !seen.insert(name) {
            return Err(SettingsError::InvalidShape(format!(
                "duplicate context name: {name}"
            )));
        }
    }
    Ok(())
}

/// Drop `project.riskLevel` unless it is an integer in 1..=10.
fn sanitize_risk_level(document: &mut Value) {
    let Some(project) = document.get_mut("project").and_then(Value::as_object_mut) else {
        return;
    };
    let Some(level) = project.get("riskLevel") else {
        return;
    };
    if level.is_null() {
        return;
    }
    let valid = level.as_u64().is_some_and(|n| (1..=10).contains(&n));
    if !valid {
        warn!(value = %level, "riskLevel must be an integer from 1 to 10, ignoring");
        let _ = project.remove("riskLevel");
    }
}

/// Drop typed leaves that cannot deserialize into the schema.
fn sanitize_leaves(document: &mut Value) {
    let Some(root) = document.as_object_mut() else {
        return;
    };

    if let Some(project) = root.get_mut("project").and_then(Value::as_object_mut) {
        drop_unless(project, "project", "description", Value::is_string);
        drop_unless(project, "project", "type", Value::is_string);
    }

    if let Some(contexts) = root.get_mut("contexts").and_then(Value::as_array_mut) {
        for ctx in contexts.iter_mut().filter_map(Value::as_object_mut) {
            let scope = match ctx.get("name").and_then(Value::as_str) {
                Some(name) => format!("contexts.{name}"),
                None => "contexts".to_owned(),
            };
            drop_unless(ctx, &scope, "stack", is_stack);
            sanitize_github(ctx, &scope);
            sanitize_feature_map(ctx, &scope, "tooling");
            sanitize_feature_map(ctx, &scope, "methodology");
        }
    }

    drop_unless(root, "root", "shared", is_optional_object);
    if let Some(shared) = root.get_mut("shared").and_then(Value::as_object_mut) {
        sanitize_feature_map(shared, "shared", "tooling");
        sanitize_feature_map(shared, "shared", "methodology");
    }

    sanitize_github(root, "root");

    drop_unless(root, "root", "features", is_optional_object);
    if let Some(features) = root.get_mut("features").and_then(Value::as_object_mut) {
        drop_unless(features, "features", "workflow", is_optional_object);
        if let Some(workflow) = features.get_mut("workflow").and_then(Value::as_object_mut) {
            drop_unless(workflow, "features.workflow", "autoCommit", is_optional_bool);
        }
    }
}

fn sanitize_github(owner: &mut Map<String, Value>, scope: &str) {
    drop_unless(owner, scope, "github", is_optional_object);
    let Some(github) = owner.get_mut("github").and_then(Value::as_object_mut) else {
        return;
    };
    let scope = format!("{scope}.github");
    for key in ["owner", "repo", "defaultBranch"] {
        drop_unless(github, &scope, key, is_optional_string);
    }
}

/// Records must be mappings; inside one, `enabled` must be a bool and
/// `command` a string.
fn sanitize_feature_map(owner: &mut Map<String, Value>, scope: &str, key: &str) {
    drop_unless(owner, scope, key, is_optional_object);
    let Some(records) = owner.get_mut(key).and_then(Value::as_object_mut) else {
        return;
    };
    let scope = format!("{scope}.{key}");

    let invalid: Vec<String> = records
        .iter()
        .filter(|(_, record)| !record.is_object())
        .map(|(name, _)| name.clone())
        .collect();
    for name in invalid {
        drop_unless(records, &scope, &name, Value::is_object);
    }

    for (name, record) in records.iter_mut() {
        if let Some(fields) = record.as_object_mut() {
            let scope = format!("{scope}.{name}");
            drop_unless(fields, &scope, "enabled", Value::is_boolean);
            drop_unless(fields, &scope, "command", is_optional_string);
        }
    }
}

/// Remove `map[key]` with a warning when it is present and fails `valid`.
fn drop_unless(map: &mut Map<String, Value>, scope: &str, key: &str, valid: fn(&Value) -> bool) {
    let Some(value) = map.get(key) else {
        return;
    };
    if valid(value) {
        return;
    }
    warn!(scope, key, value = %value, "config value does not match schema, ignoring");
    let _ = map.remove(key);
}

fn is_optional_object(value: &Value) -> bool {
    value.is_null() || value.is_object()
}

fn is_optional_string(value: &Value) -> bool {
    value.is_null() || value.is_string()
}

fn is_optional_bool(value: &Value) -> bool {
    value.is_null() || value.is_boolean()
}

fn is_stack(value: &Value) -> bool {
    match value {
        Value::Null | Value::String(_) => true,
        Value::Array(items) => items.iter().all(Value::is_string),
        _ => false,
    }
}

/// Recursive deep merge of two JSON values.
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = match target_map.remove(&key) {
                    Some(target_val) => deep_merge(target_val, source_val),
                    None => source_val,
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
