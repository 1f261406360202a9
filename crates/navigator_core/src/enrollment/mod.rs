//! Enrollment reconciliation engine.
//!
//! # Responsibility
//! - Merge requested subject and exam enrollments into a student's
//!   existing sets.
//! - Enforce the subject/exam consistency rule: an exam is attached only
//!   when the student is enrolled in the exam's subject.
//! - Report unresolved ids and rejected exams as data, not errors.
//!
//! # Invariants
//! - Subjects are merged before exams are filtered, and exams are checked
//!   against the merged subject set.
//! - Enrollment sets only grow.
//! - One reconciliation performs at most one student read, one subject
//!   batch fetch, one exam batch fetch and one student write.

pub mod eligibility;
pub mod merge;
pub mod reconcile;

use crate::model::exam::{Exam, ExamId};
use crate::model::student::{Student, StudentId};
use crate::model::subject::{Subject, SubjectId};
use crate::repo::exam_repo::{ExamRepository, SqliteExamRepository};
use crate::repo::student_repo::{SqliteStudentRepository, StudentRepository};
use crate::repo::subject_repo::{SqliteSubjectRepository, SubjectRepository};
use crate::repo::RepoResult;
use rusqlite::Connection;

/// Persistence capabilities the engine consumes.
///
/// Batch lookups return only existing records; the engine infers misses by
/// set difference.
pub trait EnrollmentStore {
    fn find_subjects_by_ids(&self, ids: &[SubjectId]) -> RepoResult<Vec<Subject>>;
    fn find_exams_by_ids(&self, ids: &[ExamId]) -> RepoResult<Vec<Exam>>;
    fn get_student(&self, id: StudentId) -> RepoResult<Option<Student>>;
    /// Upsert; returns the persisted representation.
    fn save_student(&self, student: &Student) -> RepoResult<Student>;
}

/// [`EnrollmentStore`] over the three SQLite repositories sharing one
/// connection.
pub struct SqliteEnrollmentStore<'conn> {
    subjects: SqliteSubjectRepository<'conn>,
    exams: SqliteExamRepository<'conn>,
    students: SqliteStudentRepository<'conn>,
}

impl<'conn> SqliteEnrollmentStore<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        Ok(Self {
            subjects: SqliteSubjectRepository::try_new(conn)?,
            exams: SqliteExamRepository::try_new(conn)?,
            students: SqliteStudentRepository::try_new(conn)?,
        })
    }
}

impl EnrollmentStore for SqliteEnrollmentStore<'_> {
    fn find_subjects_by_ids(&self, ids: &[SubjectId]) -> RepoResult<Vec<Subject>> {
        self.subjects.find_subjects_by_ids(ids)
    }

    fn find_exams_by_ids(&self, ids: &[ExamId]) -> RepoResult<Vec<Exam>> {
        self.exams.find_exams_by_ids(ids)
    }

    fn get_student(&self, id: StudentId) -> RepoResult<Option<Student>> {
        self.students.get_student(id)
    }

    fn save_student(&self, student: &Student) -> RepoResult<Student> {
        self.students.save_student(student)
    }
}

/// Drops repeated ids, keeping the first occurrence of each.
pub(crate) fn dedupe_preserving_order<T: Copy + Ord>(ids: &[T]) -> Vec<T> {
    let mut seen = std::collections::BTreeSet::new();
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}
