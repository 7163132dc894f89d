//! Host-supplied startup options.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Default database location, relative to the project directory.
pub const DEFAULT_DATABASE_RELATIVE_PATH: &str = ".jarvis/activity.db";

/// Where the activity store lives.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DatabaseLocation {
    /// `SQLite` file, created if missing.
    File(PathBuf),
    /// Private in-memory database, gone on drop.
    InMemory,
}

/// How to build a [`crate::ContextServer`].
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerOptions {
    /// Project root; context paths and relative options resolve against it.
    pub project_dir: PathBuf,
    /// Config document; `.jarvis/config.yaml` when absent.
    #[serde(default)]
    pub config_path: Option<PathBuf>,
    /// Shipped template directory override. Defaults to the prompts crate's
    /// build-time `templates/` path, so deployed hosts should set it.
    #[serde(default)]
    pub builtin_prompts_dir: Option<PathBuf>,
    /// Project template directory; `.jarvis/prompts` when absent.
    #[serde(default)]
    pub project_prompts_dir: Option<PathBuf>,
    /// Activity store; `.jarvis/activity.db` when absent.
    #[serde(default)]
    pub database: Option<DatabaseLocation>,
    /// Hot-reload templates on change.
    #[serde(default)]
    pub watch: bool,
}

impl ServerOptions {
    /// Defaults for `project_dir`.
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: project_dir.into(),
            config_path: None,
            builtin_prompts_dir: None,
            project_prompts_dir: None,
            database: None,
            watch: false,
        }
    }

    /// Read the config from `path`.
    #[must_use]
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    /// Read built-in templates from `dir`.
    #[must_use]
    pub fn with_builtin_prompts_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.builtin_prompts_dir = Some(dir.into());
        self
    }

    /// Read project templates from `dir`.
    #[must_use]
    pub fn with_project_prompts_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.project_prompts_dir = Some(dir.into());
        self
    }

    /// Store activities at `location`.
    #[must_use]
    pub fn with_database(mut self, location: DatabaseLocation) -> Self {
        self.database = Some(location);
        self
    }

    /// Enable or disable template hot reload.
    #[must_use]
    pub fn with_watch(mut self, watch: bool) -> Self {
        self.watch = watch;
        self
    }

    /// Effective database location.
    pub fn database_location(&self) -> DatabaseLocation {
        match &self.database {
            Some(DatabaseLocation::File(path)) => {
                DatabaseLocation::File(self.resolve(path))
            }
            Some(DatabaseLocation::InMemory) => DatabaseLocation::InMemory,
            None => DatabaseLocation::File(self.project_dir.join(DEFAULT_DATABASE_RELATIVE_PATH)),
        }
    }

    /// Effective config path, if overridden.
    pub fn resolved_config_path(&self) -> Option<PathBuf> {
        self.config_path.as_deref().map(|p| self.resolve(p))
    }

    /// Effective project template directory, if overridden.
    pub fn resolved_project_prompts_dir(&self) -> Option<PathBuf> {
        self.project_prompts_dir.as_deref().map(|p| self.resolve(p))
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_dir.join(path)
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
