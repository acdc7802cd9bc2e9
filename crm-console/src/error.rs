//! Error types for the console session

use crm_api::ApiError;
use crm_config::ConfigError;
use crm_fields::{FieldsError, ValidationErrors};
use crm_layout::LayoutError;
use thiserror::Error;

/// Result type for console operations
pub type Result<T> = std::result::Result<T, ConsoleError>;

/// Errors surfaced by console actions
#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error(transparent)]
    Fields(#[from] FieldsError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    Api(#[from] ApiError),

    /// A submit is already in flight for this control
    #[error("another save is already in progress")]
    Busy,

    /// Delete confirmed without a pending request
    #[error("no deletion is awaiting confirmation")]
    NoPendingDeletion,
}

impl ConsoleError {
    /// True when the user may retry the same action unchanged.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Config(e) => e.is_retryable(),
            Self::Layout(e) => e.is_retryable(),
            Self::Api(e) => e.is_retryable(),
            Self::Busy => true,
            Self::Fields(_) | Self::NoPendingDeletion => false,
        }
    }

    /// Field-level messages, when the failure was a validation failure.
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Fields(FieldsError::Validation(errors)) => Some(errors),
            Self::Config(e) => e.validation_errors(),
            Self::Api(ApiError::Validation(errors)) => Some(errors),
            _ => None,
        }
    }
}

impl From<ValidationErrors> for ConsoleError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Fields(FieldsError::Validation(errors))
    }
}
