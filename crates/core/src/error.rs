//! Domain error model.

use rust_decimal::Decimal;
use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// invariants, stock guardrails). Store and transport failures belong to the
/// infrastructure crate.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. non-numeric quantity, missing field).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A domain invariant was violated.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// A record key was malformed.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// A referenced product, variant or area does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A conflicting write (stale version token, duplicate key).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Requested quantity exceeds what is available (on hand minus reserved).
    #[error("insufficient availability: requested {requested}, available {available}")]
    InsufficientAvailability { requested: Decimal, available: Decimal },

    /// A return asks for more than is currently reserved for carts.
    #[error("insufficient reservation: requested {requested}, reserved {reserved}")]
    InsufficientReservation { requested: Decimal, reserved: Decimal },

    /// Every line of an adjustment was rejected; nothing is persisted.
    #[error("adjustment has no valid lines")]
    EmptyAdjustment,
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn invalid_key(msg: impl Into<String>) -> Self {
        Self::InvalidKey(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }
}
