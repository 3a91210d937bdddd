//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("No personas configured for the panel")]
    NoPersonas,

    #[error("Duplicate persona id: {0}")]
    DuplicatePersona(String),

    #[error("Unknown persona: {0}")]
    UnknownPersona(String),

    #[error("Invalid trait '{name}' for persona {persona}: {value} is outside [0, 1]")]
    InvalidTrait {
        persona: String,
        name: &'static str,
        value: f64,
    },

    #[error("Invalid topic: {0}")]
    InvalidTopic(String),

    #[error("Transcript out of order: expected sequence {expected}, got {actual}")]
    SequenceGap { expected: u64, actual: u64 },

    #[error("Session is not running")]
    SessionNotRunning,

    #[error("Operation cancelled")]
    Cancelled,
}

impl DomainError {
    /// Check if this error represents a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, DomainError::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancelled_error_display() {
        let error = DomainError::Cancelled;
        assert_eq!(error.to_string(), "Operation cancelled");
    }

    #[test]
    fn test_is_cancelled_check() {
        assert!(DomainError::Cancelled.is_cancelled());
        assert!(!DomainError::NoPersonas.is_cancelled());
        assert!(!DomainError::UnknownPersona("x".to_string()).is_cancelled());
    }

    #[test]
    fn test_invalid_trait_display() {
        let error = DomainError::InvalidTrait {
            persona: "marcus".to_string(),
            name: "patience",
            value: 1.5,
        };
        assert_eq!(
            error.to_string(),
            "Invalid trait 'patience' for persona marcus: 1.5 is outside [0, 1]"
        );
    }
}
