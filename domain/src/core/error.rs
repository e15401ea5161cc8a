//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    #[error("Context value could not be encoded: {0}")]
    ContextEncoding(#[from] serde_json::Error),
}

impl DomainError {
    /// Check if this error came from an unknown status string
    pub fn is_invalid_status(&self) -> bool {
        matches!(self, DomainError::InvalidStatus(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_status_display() {
        let error = DomainError::InvalidStatus("paused".to_string());
        assert_eq!(error.to_string(), "Invalid status: paused");
    }

    #[test]
    fn test_is_invalid_status_check() {
        assert!(DomainError::InvalidStatus("x".to_string()).is_invalid_status());

        let encoding = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(!DomainError::ContextEncoding(encoding).is_invalid_status());
    }
}
