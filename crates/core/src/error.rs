//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Every rejected ledger operation maps to exactly one of these kinds. They are
/// deterministic business failures; storage and encoding problems live in the
/// infrastructure layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The caller's role or ownership check failed.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// A referenced key is absent from the world state.
    #[error("{0} not found")]
    NotFound(String),

    /// A natural key is already taken.
    #[error("{0} already exists")]
    AlreadyExists(String),

    /// The operation is not valid for the record's current lifecycle state.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Fewer eligible boxes than the requested minimum.
    #[error(
        "insufficient amount of egg boxes {found} for the shipment, minimum amount is {minimum}"
    )]
    InsufficientQuantity { found: usize, minimum: usize },

    /// A value failed validation (e.g. malformed natural key part).
    #[error("validation failed: {0}")]
    Validation(String),
}

impl DomainError {
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn already_exists(what: impl Into<String>) -> Self {
        Self::AlreadyExists(what.into())
    }

    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    pub fn insufficient_quantity(found: usize, minimum: usize) -> Self {
        Self::InsufficientQuantity { found, minimum }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_quantity_reports_count_and_minimum() {
        let msg = DomainError::insufficient_quantity(3, 5).to_string();
        assert!(msg.contains("egg boxes 3"));
        assert!(msg.contains("minimum amount is 5"));
    }

    #[test]
    fn already_exists_names_the_key() {
        let msg = DomainError::already_exists("Box:farmer1:202106031608").to_string();
        assert_eq!(msg, "Box:farmer1:202106031608 already exists");
    }
}
