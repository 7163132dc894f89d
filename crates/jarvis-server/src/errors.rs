//! Startup error types.

use thiserror::Error;

/// Failures that prevent a [`crate::ContextServer`] from being created.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The activity store could not be opened or migrated.
    #[error("failed to open activity store: {0}")]
    Store(#[from] jarvis_activity::ActivityError),

    /// A tool could not be registered.
    #[error("failed to register tool: {0}")]
    Tool(#[from] jarvis_tools::ToolError),
}

/// Result type for server startup.
pub type Result<T> = std::result::Result<T, ServerError>;
