//! Configuration error types.
//!
//! None of these reach callers of [`crate::ConfigResolver`]; they are carried
//! inside [`crate::Defaulted`] to explain why the defaults were used.

use std::path::PathBuf;

use thiserror::Error;

/// Reasons a configuration document could not be used.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// No file exists at the configured path.
    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// Failed to read the file from disk.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    /// The file is not valid YAML.
    #[error("failed to parse config YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// The merged document did not match the typed schema.
    #[error("config does not match schema: {0}")]
    Json(#[from] serde_json::Error),
    /// The document failed a structural check.
    #[error("invalid config shape: {0}")]
    InvalidShape(String),
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, SettingsError>;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_display_includes_path() {
        let err = SettingsError::NotFound(PathBuf::from("/p/.jarvis/config.yaml"));
        assert_eq!(
            err.to_string(),
            "config file not found: /p/.jarvis/config.yaml"
        );
    }

    #[test]
    fn yaml_error_display() {
        let yaml_err = serde_yaml::from_str::<serde_json::Value>("a: [").unwrap_err();
        let err = SettingsError::from(yaml_err);
        assert!(err.to_string().starts_with("failed to parse config YAML"));
    }

    #[test]
    fn invalid_shape_display() {
        let err = SettingsError::InvalidShape("contexts must not be empty".into());
        assert_eq!(
            err.to_string(),
            "invalid config shape: contexts must not be empty"
        );
    }
}
