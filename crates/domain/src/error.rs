//! Unified error types for the domain layer
//!
//! Domain operations are pure, so the only failures are malformed input and
//! rule violations. Adapters convert these into their own error types.

use thiserror::Error;

/// Unified error type for domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Validation failed (e.g., invalid field values)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Invalid ID format
    #[error("Invalid ID format: {0}")]
    InvalidId(String),

    /// Parse error (for value objects)
    #[error("Parse error: {0}")]
    Parse(String),

    /// State transition not allowed
    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),

    /// A gang or fighter resource is too low for the requested action
    #[error("Not enough {resource}: need {required}, have {available}")]
    InsufficientResource {
        resource: &'static str,
        required: i64,
        available: i64,
    },
}

impl DomainError {
    /// Creates a validation error for out-of-range or malformed input.
    ///
    /// # Example
    /// ```
    /// use gangbook_domain::DomainError;
    ///
    /// let err = DomainError::validation("sell value cannot be negative");
    /// assert_eq!(err.to_string(), "Validation failed: sell value cannot be negative");
    /// ```
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an invalid ID error
    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    /// Creates a parse error for string-to-type conversion failures.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create an invalid state transition error
    pub fn invalid_state_transition(msg: impl Into<String>) -> Self {
        Self::InvalidStateTransition(msg.into())
    }

    /// Create an insufficient resource error (meat, credits, xp)
    pub fn insufficient(resource: &'static str, required: i64, available: i64) -> Self {
        Self::InsufficientResource {
            resource,
            required,
            available,
        }
    }

    /// Whether this error is a failed precondition rather than bad input.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::InsufficientResource { .. } | Self::InvalidStateTransition(_)
        )
    }
}
