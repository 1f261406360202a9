//! Exam record.
//!
//! # Invariants
//! - Every exam has exactly one owning subject.
//! - At most one exam exists per subject. The service layer checks this
//!   before writes and the storage unique index backs it up.

use crate::model::subject::{Subject, SubjectId};
use crate::model::{require_name, EntityKind, ModelValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable exam identifier.
pub type ExamId = Uuid;

/// Exam read model. Carries its owning subject so diagnostics can name it
/// without another lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Exam {
    pub id: ExamId,
    pub name: String,
    pub subject: Subject,
}

impl Exam {
    /// Creates an exam with a generated id, owned by `subject`.
    pub fn new(name: &str, subject: Subject) -> Result<Self, ModelValidationError> {
        Self::with_id(Uuid::new_v4(), name, subject)
    }

    /// Creates an exam with a caller-provided id.
    pub fn with_id(
        id: ExamId,
        name: &str,
        subject: Subject,
    ) -> Result<Self, ModelValidationError> {
        Ok(Self {
            id,
            name: require_name(EntityKind::Exam, name)?,
            subject,
        })
    }

    pub fn subject_id(&self) -> SubjectId {
        self.subject.id
    }

    /// Checks that the record can be persisted as-is.
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        require_name(EntityKind::Exam, &self.name)?;
        self.subject.validate()
    }
}
