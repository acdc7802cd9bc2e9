//! Error types for the configuration store

use crm_fields::ValidationErrors;
use thiserror::Error;

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur reading or writing the configuration document
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Local validation failed; nothing was sent to the backend
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    /// Custom field not found by id
    #[error("custom field not found: {id}")]
    FieldNotFound { id: String },

    /// The backend rejected or failed the write after all attempts
    #[error("failed to persist configuration after {attempts} attempt(s): {message}")]
    Persistence { attempts: u32, message: String },

    /// A backend call did not finish in time
    #[error("configuration save timed out after {elapsed_ms}ms")]
    Timeout { elapsed_ms: u64 },

    /// Another write is in flight
    #[error("configuration store busy - another save in progress")]
    Busy,

    /// The store has been shut down
    #[error("configuration store is closed")]
    Closed,

    /// Console settings could not be loaded
    #[error("settings error: {message}")]
    Settings { message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl ConfigError {
    /// Create a persistence error from a backend message
    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence {
            attempts: 1,
            message: message.into(),
        }
    }

    /// Create a settings error
    pub fn settings(message: impl Into<String>) -> Self {
        Self::Settings {
            message: message.into(),
        }
    }

    /// Check if the same request may succeed when retried
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Persistence { .. } | Self::Timeout { .. } | Self::Busy | Self::Io(_)
        )
    }

    /// Field-level messages when this is a validation failure
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

impl From<ValidationErrors> for ConfigError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ConfigError::FieldNotFound { id: "01ABC".into() };
        assert_eq!(err.to_string(), "custom field not found: 01ABC");
    }

    #[test]
    fn test_retryable() {
        assert!(ConfigError::Busy.is_retryable());
        assert!(ConfigError::persistence("backend down").is_retryable());
        assert!(ConfigError::Timeout { elapsed_ms: 10 }.is_retryable());
        assert!(!ConfigError::Closed.is_retryable());
        assert!(!ConfigError::Validation(ValidationErrors::new()).is_retryable());
    }

    #[test]
    fn test_validation_errors_accessor() {
        let mut errors = ValidationErrors::new();
        errors.insert("primary", "bad color");
        let err = ConfigError::from(errors);
        assert_eq!(
            err.validation_errors().and_then(|e| e.get("primary")),
            Some("bad color")
        );
        assert!(ConfigError::Busy.validation_errors().is_none());
    }
}
