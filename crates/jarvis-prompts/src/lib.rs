//! # jarvis-prompts
//!
//! Prompt templates for the Jarvis context server.
//!
//! Templates are YAML files holding metadata plus a Handlebars body. They
//! come from a built-in directory shipped with this crate and an optional
//! project directory whose entries shadow built-ins by name.
//!
//! - [`loader`] indexes metadata, partials and the shared constitution
//!   without compiling any body
//! - [`TemplateCache`] holds compiled templates until invalidated
//! - [`TemplateStore`] renders prompts against the resolved project config
//! - [`watcher::TemplateWatcher`] turns file-system events into cache
//!   invalidation and [`PromptsChanged`] notifications

#![deny(unsafe_code)]

pub mod cache;
pub mod errors;
pub mod helpers;
pub mod loader;
pub mod store;
pub mod types;
pub mod watcher;

pub use cache::TemplateCache;
pub use errors::{PromptError, Result};
pub use store::TemplateStore;
pub use types::{CompiledTemplate, PromptFile, PromptsChanged, TemplateSource};

/// Directory holding the templates shipped with this crate.
///
/// This is the crate's source location at build time. A binary run away
/// from its build tree must point the store at an installed copy with
/// [`TemplateStore::with_builtin_dir`]; a missing directory simply yields
/// no built-in prompts.
pub const BUILTIN_TEMPLATES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/templates");

/// Project template directory, relative to the project root.
pub const PROJECT_TEMPLATES_RELATIVE_PATH: &str = ".jarvis/prompts";
