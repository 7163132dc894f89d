//! # jarvis-settings
//!
//! Project configuration for the Jarvis context server.
//!
//! A project describes itself in one YAML document (`.jarvis/config.yaml`):
//! project metadata, one or more contexts (sub-project roots) and optional
//! shared tooling/methodology that every context inherits.
//!
//! - [`loader::load`] never fails hard: a missing or malformed document
//!   degrades to [`ProjectConfig::default`] and reports why via [`Defaulted`]
//! - [`ConfigResolver`] memoizes the loaded document and computes
//!   [`ResolvedContext`]s by overlaying each context on the shared block

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod resolver;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{CONFIG_RELATIVE_PATH, Defaulted, deep_merge, load, load_or_default};
pub use resolver::{ConfigResolver, ConfigSource, ResolvedContext};
pub use types::{
    Context, FeatureMap, FeatureRecord, Features, GithubConfig, ProjectConfig, ProjectInfo,
    SharedSettings, Stack, WorkflowFeatures,
};
