//! Service layer: schedules behind a repository, one writer per schedule.

pub mod schedule_service;

pub use schedule_service::ScheduleService;

use crate::db::RepositoryError;
use crate::models::{DomainError, ErrorKind};

/// Failure of a service call: either the domain refused the operation or
/// the repository could not serve it.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl ServiceError {
    /// Domain error kind, when the domain refused the call.
    pub fn domain_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Domain(err) => Some(err.kind()),
            Self::Repository(_) => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Repository(err) if err.is_not_found())
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
