//! Error types for backend access

use crm_fields::ValidationErrors;
use thiserror::Error;

/// Result type for backend operations
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors that can occur talking to the REST backend
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport or decoding failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status
    #[error("backend returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Base URL could not be parsed or cannot carry a path
    #[error("invalid API URL: {0}")]
    Url(#[from] url::ParseError),

    /// A draft failed local checks and was not sent
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),
}

impl ApiError {
    /// Transport failures and server-side errors may succeed on retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            Self::Status { status, .. } => *status >= 500 || *status == 429,
            Self::Url(_) | Self::Validation(_) => false,
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display() {
        let err = ApiError::Status {
            status: 404,
            body: "not found".into(),
        };
        assert_eq!(err.to_string(), "backend returned 404: not found");
    }

    #[test]
    fn test_retryable_statuses() {
        let status = |status| ApiError::Status {
            status,
            body: String::new(),
        };
        assert!(status(503).is_retryable());
        assert!(status(429).is_retryable());
        assert!(!status(400).is_retryable());
        assert!(!ApiError::from(ValidationErrors::new()).is_retryable());
    }
}
