//! Error types for page composition

use crm_config::ConfigError;
use thiserror::Error;

use crate::builder::ListKind;

/// Result type for layout operations
pub type Result<T> = std::result::Result<T, LayoutError>;

/// Errors raised while editing or rendering page layouts
#[derive(Debug, Error)]
pub enum LayoutError {
    /// A move named a widget that is not in its source list
    #[error("'{id}' is not in the {list} list")]
    NotInList { id: String, list: ListKind },

    /// Widget identifier has no registry entry
    #[error("Component '{id}' not found in registry")]
    UnknownWidget { id: String },

    /// The configuration store rejected the layout
    #[error(transparent)]
    Store(#[from] ConfigError),
}

impl LayoutError {
    /// True when retrying the same action may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Store(e) if e.is_retryable())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LayoutError::NotInList {
            id: "SalesChart".into(),
            list: ListKind::Active,
        };
        assert_eq!(err.to_string(), "'SalesChart' is not in the active list");

        let err = LayoutError::UnknownWidget {
            id: "Nonexistent".into(),
        };
        assert_eq!(
            err.to_string(),
            "Component 'Nonexistent' not found in registry"
        );
    }

    #[test]
    fn test_store_errors_keep_retryability() {
        assert!(LayoutError::from(ConfigError::Busy).is_retryable());
        assert!(!LayoutError::from(ConfigError::Closed).is_retryable());
        assert!(!LayoutError::UnknownWidget { id: "x".into() }.is_retryable());
    }
}
