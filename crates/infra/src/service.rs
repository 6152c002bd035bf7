//! Shared plumbing for the transactional services.

use thiserror::Error;
use tracing::warn;

use defaultdesk_core::{DomainError, ErrorKind, Resource};

use crate::repository::{RepositoryError, UnitOfWork};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Error returned by every service operation.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] RepositoryError),

    /// Password hashing or token signing failed.
    #[error("credential processing failed: {0}")]
    Credentials(String),
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::Domain(e) => e.kind(),
            ServiceError::Store(_) | ServiceError::Credentials(_) => ErrorKind::Internal,
        }
    }

    pub fn domain(&self) -> Option<&DomainError> {
        match self {
            ServiceError::Domain(e) => Some(e),
            _ => None,
        }
    }
}

pub(crate) trait StoreResultExt<T> {
    /// Translate a store `NotFound` into the domain `NotFound` for `resource`.
    fn or_not_found(self, resource: Resource) -> ServiceResult<T>;

    /// Treat a store `NotFound` as absence.
    fn optional(self) -> ServiceResult<Option<T>>;
}

impl<T> StoreResultExt<T> for Result<T, RepositoryError> {
    fn or_not_found(self, resource: Resource) -> ServiceResult<T> {
        self.map_err(|e| match e {
            RepositoryError::NotFound => ServiceError::Domain(DomainError::not_found(resource)),
            other => ServiceError::Store(other),
        })
    }

    fn optional(self) -> ServiceResult<Option<T>> {
        match self {
            Ok(v) => Ok(Some(v)),
            Err(RepositoryError::NotFound) => Ok(None),
            Err(e) => Err(ServiceError::Store(e)),
        }
    }
}

/// Commit on success, roll back on failure.
///
/// A rollback failure is logged and the original error is returned.
pub(crate) async fn complete<T>(uow: Box<dyn UnitOfWork>, result: ServiceResult<T>) -> ServiceResult<T> {
    match result {
        Ok(value) => {
            uow.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = uow.rollback().await {
                warn!(error = %rollback_err, "rollback failed");
            }
            Err(err)
        }
    }
}
