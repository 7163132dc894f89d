//! Tool error types.
//!
//! The split between [`ToolError::Validation`] and [`ToolError::Storage`]
//! decides how a failure is worded for the caller.

use thiserror::Error;

/// Errors a tool handler or the registry can raise.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The caller's arguments are unusable.
    #[error("validation error: {message}")]
    Validation {
        /// What was wrong with the input.
        message: String,
    },

    /// Persistent storage failed; not the caller's fault.
    #[error("storage error: {message}")]
    Storage {
        /// Underlying failure.
        message: String,
    },

    /// A tool's declared input schema does not compile.
    #[error("invalid schema for tool '{tool}': {message}")]
    InvalidSchema {
        /// Tool name.
        tool: String,
        /// Compiler message.
        message: String,
    },

    /// Arguments could not be decoded after passing schema validation.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl ToolError {
    /// Shorthand for [`ToolError::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Whether the caller caused this failure.
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::Validation { .. } | Self::Serde(_))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification() {
        assert!(ToolError::validation("x").is_input_error());
        assert!(
            !ToolError::Storage {
                message: "disk".into()
            }
            .is_input_error()
        );
        let serde_err = serde_json::from_str::<u8>("\"a\"").unwrap_err();
        assert!(ToolError::from(serde_err).is_input_error());
    }

    #[test]
    fn display() {
        assert_eq!(ToolError::validation("bad").to_string(), "validation error: bad");
        let err = ToolError::InvalidSchema {
            tool: "t".into(),
            message: "m".into(),
        };
        assert_eq!(err.to_string(), "invalid schema for tool 't': m");
    }
}
