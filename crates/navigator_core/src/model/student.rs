//! Student record and enrollment sets.
//!
//! # Invariants
//! - `subject_ids` and `exam_ids` hold each id at most once.
//! - Only the enrollment engine mutates these sets, and it only ever adds.
//! - An exam is added only while its subject is in `subject_ids`. Moving an
//!   exam to another subject later does not revisit existing enrollments.

use crate::model::exam::ExamId;
use crate::model::normalize_name;
use crate::model::subject::SubjectId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Stable student identifier.
pub type StudentId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    /// Optional; a blank input name is stored as `None`.
    pub name: Option<String>,
    pub subject_ids: BTreeSet<SubjectId>,
    pub exam_ids: BTreeSet<ExamId>,
}

impl Student {
    /// Creates a student with a generated id and no enrollments.
    pub fn new(name: Option<&str>) -> Self {
        Self::with_id(Uuid::new_v4(), name)
    }

    pub fn with_id(id: StudentId, name: Option<&str>) -> Self {
        Self {
            id,
            name: name.and_then(normalize_name),
            subject_ids: BTreeSet::new(),
            exam_ids: BTreeSet::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Student;

    #[test]
    fn blank_name_is_stored_as_none() {
        assert_eq!(Student::new(Some("   ")).name, None);
        assert_eq!(
            Student::new(Some(" Ada  Lovelace ")).name.as_deref(),
            Some("Ada Lovelace")
        );
    }

    #[test]
    fn new_student_has_no_enrollments() {
        let student = Student::new(None);
        assert!(student.subject_ids.is_empty());
        assert!(student.exam_ids.is_empty());
    }
}
