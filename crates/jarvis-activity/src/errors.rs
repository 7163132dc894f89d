//! Error types for activity logging.

use thiserror::Error;

/// Errors raised by the activity store and logger.
#[derive(Debug, Error)]
pub enum ActivityError {
    /// `SQLite` error.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Connection pool error.
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// Filesystem error while preparing the database location.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Schema migration failed.
    #[error("migration error: {message}")]
    Migration {
        /// Which migration failed and why.
        message: String,
    },

    /// The caller supplied unusable input.
    #[error("invalid activity: {0}")]
    InvalidInput(String),

    /// The store broke an invariant the logger depends on.
    #[error("store invariant violated: {0}")]
    Invariant(String),
}

impl ActivityError {
    /// Whether the caller can fix this by changing its input.
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}

/// Convenience type alias for activity results.
pub type Result<T> = std::result::Result<T, ActivityError>;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
