//! Domain error types

use thiserror::Error;

/// Domain-level errors
///
/// Raised by entity state transitions and value object construction.
/// None of these involve I/O; they are all detected before a request is sent.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Message not found: {0}")]
    MessageNotFound(String),

    #[error("Message {0} is not a bargain offer")]
    NotBargain(String),

    #[error("Invalid bargain transition: {0}")]
    InvalidTransition(String),
}

impl DomainError {
    /// Check if this error was raised by input validation
    pub fn is_validation(&self) -> bool {
        matches!(self, DomainError::Validation(_))
    }
}
