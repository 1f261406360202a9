//! Subject record.

use crate::model::{require_name, EntityKind, ModelValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable subject identifier.
pub type SubjectId = Uuid;

/// A course of study that students enroll in and exams belong to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Subject {
    pub id: SubjectId,
    pub name: String,
}

impl Subject {
    /// Creates a subject with a generated id and a normalized name.
    pub fn new(name: &str) -> Result<Self, ModelValidationError> {
        Self::with_id(Uuid::new_v4(), name)
    }

    /// Creates a subject with a caller-provided id.
    pub fn with_id(id: SubjectId, name: &str) -> Result<Self, ModelValidationError> {
        Ok(Self {
            id,
            name: require_name(EntityKind::Subject, name)?,
        })
    }

    /// Checks that the record can be persisted as-is.
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        require_name(EntityKind::Subject, &self.name).map(|_| ())
    }
}
