//! Student enrollment reconciliation.
//!
//! # Responsibility
//! - Load the student, apply an optional rename, merge subjects, filter
//!   exams against the merged subjects, and save once.
//! - Return unresolved ids and rejected exams alongside the saved student.
//!
//! # Invariants
//! - An unknown student aborts before any write.
//! - Unresolved ids and rejected exams never abort; everything that
//!   resolves is applied.
//! - The student is written exactly once per successful call.

use crate::enrollment::eligibility::{filter_exams, rejected_subjects, RejectedExam};
use crate::enrollment::merge::merge_subjects;
use crate::enrollment::EnrollmentStore;
use crate::model::exam::ExamId;
use crate::model::student::{Student, StudentId};
use crate::model::subject::{Subject, SubjectId};
use crate::model::{normalize_name, EntityKind};
use crate::service::error::{ServiceError, ServiceResult};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Requested change for one student. Omitted fields leave state untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentUpdate {
    /// Replaces the name when present and non-blank.
    pub name: Option<String>,
    /// Subject ids to add; may contain stale or unknown ids.
    pub enrolled_subjects: Option<Vec<SubjectId>>,
    /// Exam ids to add; may contain stale or unknown ids.
    pub enrolled_exams: Option<Vec<ExamId>>,
}

/// Whether every requested id resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionStatus {
    Complete,
    /// At least one requested subject or exam id did not resolve.
    Partial,
}

/// Result of a successful reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileOutcome {
    /// Student as persisted.
    pub student: Student,
    pub not_found_subject_ids: Vec<SubjectId>,
    pub not_found_exam_ids: Vec<ExamId>,
    /// Existing exams refused because their subject is not enrolled.
    pub rejected_exams: Vec<RejectedExam>,
}

impl ReconcileOutcome {
    pub fn status(&self) -> ResolutionStatus {
        if self.not_found_subject_ids.is_empty() && self.not_found_exam_ids.is_empty() {
            ResolutionStatus::Complete
        } else {
            ResolutionStatus::Partial
        }
    }

    /// Distinct subjects behind the rejected exams.
    pub fn rejected_subjects(&self) -> Vec<Subject> {
        rejected_subjects(&self.rejected_exams)
    }

    /// Human-readable rejection summary; `None` when nothing was rejected.
    pub fn message(&self) -> Option<String> {
        if self.rejected_exams.is_empty() {
            return None;
        }
        let details = self
            .rejected_exams
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        Some(format!("invalid exam enrollment: {details}"))
    }
}

/// Enrollment use-case service over an [`EnrollmentStore`].
pub struct EnrollmentService<S: EnrollmentStore> {
    store: S,
}

impl<S: EnrollmentStore> EnrollmentService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Merges the requested enrollments into the student's existing sets.
    ///
    /// # Errors
    /// - `ServiceError::NotFound` when `student_id` is unknown; nothing is
    ///   written.
    /// - `ServiceError::Repo` on storage failure.
    pub fn reconcile_student(
        &self,
        student_id: StudentId,
        update: &StudentUpdate,
    ) -> ServiceResult<ReconcileOutcome> {
        let started_at = Instant::now();
        let mut student = match self.store.get_student(student_id)? {
            Some(student) => student,
            None => {
                warn!(
                    "event=student_reconcile module=enrollment status=error error_code=not_found student_id={student_id}"
                );
                return Err(ServiceError::not_found(EntityKind::Student, student_id));
            }
        };

        if let Some(name) = update.name.as_deref().and_then(normalize_name) {
            student.name = Some(name);
        }

        let subject_merge = merge_subjects(
            &self.store,
            &student.subject_ids,
            update.enrolled_subjects.as_deref().unwrap_or_default(),
        )?;
        let subjects_added = subject_merge.added(&student.subject_ids).count();
        student.subject_ids = subject_merge.merged;

        // Must run against the merged subjects, not the loaded ones.
        let eligibility = filter_exams(
            &self.store,
            &student.subject_ids,
            &student.exam_ids,
            update.enrolled_exams.as_deref().unwrap_or_default(),
        )?;
        let exams_accepted = eligibility.accepted.len();
        student.exam_ids = eligibility.merged;

        let saved = self.store.save_student(&student)?;
        let outcome = ReconcileOutcome {
            student: saved,
            not_found_subject_ids: subject_merge.not_found,
            not_found_exam_ids: eligibility.not_found,
            rejected_exams: eligibility.rejected,
        };

        let clean = outcome.status() == ResolutionStatus::Complete
            && outcome.rejected_exams.is_empty();
        let summary = format!(
            "student_id={student_id} subjects={} subjects_added={subjects_added} exams={} exams_accepted={exams_accepted} not_found_subjects={} not_found_exams={} rejected_exams={} duration_ms={}",
            outcome.student.subject_ids.len(),
            outcome.student.exam_ids.len(),
            outcome.not_found_subject_ids.len(),
            outcome.not_found_exam_ids.len(),
            outcome.rejected_exams.len(),
            started_at.elapsed().as_millis()
        );
        if clean {
            info!("event=student_reconcile module=enrollment status=ok {summary}");
        } else {
            warn!("event=student_reconcile module=enrollment status=partial {summary}");
        }

        Ok(outcome)
    }
}
