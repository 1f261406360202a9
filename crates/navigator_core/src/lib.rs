//! Core domain logic for the learning navigator.
//! Owns the subject/exam/student records, their SQLite storage, and the
//! enrollment reconciliation engine that guards the subject/exam rule.

pub mod config;
pub mod db;
pub mod enrollment;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::CoreConfig;
pub use enrollment::eligibility::{ExamEligibility, RejectedExam};
pub use enrollment::merge::SubjectMerge;
pub use enrollment::reconcile::{
    EnrollmentService, ReconcileOutcome, ResolutionStatus, StudentUpdate,
};
pub use enrollment::{EnrollmentStore, SqliteEnrollmentStore};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::exam::{Exam, ExamId};
pub use model::student::{Student, StudentId};
pub use model::subject::{Subject, SubjectId};
pub use model::{EntityKind, ModelValidationError};
pub use repo::exam_repo::{ExamRepository, SqliteExamRepository};
pub use repo::student_repo::{SqliteStudentRepository, StudentRepository};
pub use repo::subject_repo::{SqliteSubjectRepository, SubjectRepository};
pub use repo::{RepoError, RepoResult};
pub use service::error::{ServiceError, ServiceResult};
pub use service::exam_service::{ensure_subject_available, ExamPatch, ExamService, NewExam};
pub use service::student_service::StudentService;
pub use service::subject_service::SubjectService;
pub use service::CrudService;

/// Minimal health-check API.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
