//! Error types for the custom field schema

use thiserror::Error;

use crate::validation::ValidationErrors;

/// Result type for custom field operations
pub type Result<T> = std::result::Result<T, FieldsError>;

/// Errors that can occur when working with custom field definitions
#[derive(Debug, Error)]
pub enum FieldsError {
    /// One or more draft rules failed
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    /// Entity type string is not one of the known entity types
    #[error("unknown entity type: {value}")]
    UnknownEntity { value: String },

    /// Field type string is not one of the known field types
    #[error("unknown field type: {value}")]
    UnknownFieldType { value: String },

    /// Draft key does not name an editable draft attribute
    #[error("unknown draft attribute: {key}")]
    UnknownDraftKey { key: String },
}

impl From<ValidationErrors> for FieldsError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FieldsError::UnknownEntity {
            value: "lead".into(),
        };
        assert_eq!(err.to_string(), "unknown entity type: lead");
    }

    #[test]
    fn test_validation_error_lists_messages() {
        let mut errors = ValidationErrors::new();
        errors.insert("label", "Display label is required");
        let err = FieldsError::from(errors);
        assert!(err.to_string().contains("label"));
        assert!(err.to_string().contains("Display label is required"));
    }
}
