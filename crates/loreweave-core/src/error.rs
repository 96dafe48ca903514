//! Domain error types.

use thiserror::Error;

use crate::service::ServiceError;

/// Top-level domain error type.
///
/// Only hard failures travel through this type. Expected outcomes of
/// multi-user contention (rejected or locked contributions) are ordinary
/// values and never appear here.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A referenced row was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// A uniqueness constraint rejected a write.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A validation error in domain logic.
    #[error("validation error: {0}")]
    Validation(String),

    /// An external generation or hosting service failed.
    #[error("upstream {service} failed: {message}")]
    Upstream {
        /// The collaborator that failed (`text`, `image`, `hosting`).
        service: &'static str,
        /// Failure detail.
        message: String,
    },

    /// A call or the whole synthesis exceeded its time budget.
    #[error("timed out: {0}")]
    Timeout(String),

    /// An infrastructure/persistence error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}

impl DomainError {
    /// Wraps a service failure for the named collaborator.
    #[must_use]
    pub fn upstream(service: &'static str, err: &ServiceError) -> Self {
        match err {
            ServiceError::Timeout(detail) => Self::Timeout(format!("{service}: {detail}")),
            other => Self::Upstream {
                service,
                message: other.to_string(),
            },
        }
    }
}
