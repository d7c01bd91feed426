//! Service-level error: domain failures and store failures in one type.

use thiserror::Error;

use storeledger_core::DomainError;

use crate::record_store::StoreError;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ServiceError {
    /// Whether re-reading and retrying can succeed (a stale version token).
    pub fn is_retryable(&self) -> bool {
        matches!(self, ServiceError::Store(StoreError::Conflict(_)))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::Domain(DomainError::NotFound(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_version_conflicts_are_retryable() {
        assert!(ServiceError::from(StoreError::Conflict("v".into())).is_retryable());
        assert!(!ServiceError::from(StoreError::Unavailable("down".into())).is_retryable());
        assert!(!ServiceError::from(DomainError::conflict("duplicate area code")).is_retryable());
        assert!(ServiceError::from(DomainError::not_found("x")).is_not_found());
    }
}
