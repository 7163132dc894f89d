//! Error types for the template store.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while indexing, compiling or rendering prompts.
#[derive(Debug, Error)]
pub enum PromptError {
    /// No template with this name exists in any source.
    #[error("unknown prompt: {0}")]
    UnknownPrompt(String),

    /// A required argument was not supplied.
    #[error("prompt '{prompt}' requires argument '{argument}'")]
    MissingArgument {
        /// Prompt being rendered.
        prompt: String,
        /// Missing argument name.
        argument: String,
    },

    /// A template file is not valid YAML or lacks required keys.
    #[error("invalid template file {}: {message}", path.display())]
    Parse {
        /// Offending file.
        path: PathBuf,
        /// What was wrong.
        message: String,
    },

    /// The Handlebars body failed to compile.
    #[error("failed to compile prompt '{name}': {message}")]
    Compile {
        /// Prompt name.
        name: String,
        /// Compiler message.
        message: String,
    },

    /// Rendering failed (unknown helper, missing partial, helper error).
    #[error("failed to render prompt '{name}': {message}")]
    Render {
        /// Prompt name.
        name: String,
        /// Renderer message.
        message: String,
    },

    /// Filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file watcher could not be started.
    #[error("watch error: {0}")]
    Watch(#[from] notify::Error),
}

impl PromptError {
    /// Whether the caller caused this (bad name or arguments).
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::UnknownPrompt(_) | Self::MissingArgument { .. })
    }
}

/// Result type for template store operations.
pub type Result<T> = std::result::Result<T, PromptError>;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
