//! Domain error types

use crate::research::entities::JobStatus;
use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Unknown research strategy: {0}")]
    UnknownStrategy(String),

    #[error("Unknown research type: {0}")]
    UnknownResearchKind(String),

    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: JobStatus, to: JobStatus },
}

impl DomainError {
    /// Check if this error is a rejected status transition
    pub fn is_invalid_transition(&self) -> bool {
        matches!(self, DomainError::InvalidTransition { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_strategy_display() {
        let error = DomainError::UnknownStrategy("medium".to_string());
        assert_eq!(error.to_string(), "Unknown research strategy: medium");
    }

    #[test]
    fn test_invalid_transition_check() {
        let error = DomainError::InvalidTransition {
            from: JobStatus::Completed,
            to: JobStatus::Running,
        };
        assert!(error.is_invalid_transition());
        assert!(!DomainError::UnknownStrategy("x".into()).is_invalid_transition());
    }
}
