//! Request-level errors shared by the entity services and the enrollment
//! engine.
//!
//! `NotFound` and `Conflict` abort a request before any write. Partial
//! resolution during enrollment is reported as outcome data and never
//! becomes a `ServiceError`.

use crate::model::exam::ExamId;
use crate::model::subject::SubjectId;
use crate::model::{EntityKind, ModelValidationError};
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug)]
pub enum ServiceError {
    /// Direct-by-id target does not exist.
    NotFound { kind: EntityKind, id: Uuid },
    /// Another exam already owns the subject.
    Conflict {
        subject_id: SubjectId,
        existing_exam_id: ExamId,
    },
    Validation(ModelValidationError),
    Repo(RepoError),
}

impl ServiceError {
    pub fn not_found(kind: EntityKind, id: Uuid) -> Self {
        Self::NotFound { kind, id }
    }

    /// Short machine-readable code for logs and outer layers.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::Conflict { .. } => "conflict",
            Self::Validation(_) => "invalid_input",
            Self::Repo(_) => "storage_failed",
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            Self::Conflict {
                subject_id,
                existing_exam_id,
            } => write!(
                f,
                "exam already exists for subject {subject_id}: {existing_exam_id}"
            ),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(kind, id) => Self::NotFound { kind, id },
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

impl From<ModelValidationError> for ServiceError {
    fn from(value: ModelValidationError) -> Self {
        Self::Validation(value)
    }
}
