//! Exam eligibility filter.
//!
//! An exam is eligible for a student only when the student is enrolled in
//! the exam's owning subject, compared by id. Callers must pass the subject
//! set produced by the merge step so that subjects and exams submitted in
//! one request are judged together.

use crate::enrollment::{dedupe_preserving_order, EnrollmentStore};
use crate::model::exam::{Exam, ExamId};
use crate::model::subject::{Subject, SubjectId};
use crate::repo::RepoResult;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt::{Display, Formatter};

/// An existing exam that was not attached because its subject is not
/// enrolled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedExam {
    pub exam_id: ExamId,
    pub exam_name: String,
    pub subject_id: SubjectId,
    pub subject_name: String,
}

impl RejectedExam {
    fn from_exam(exam: Exam) -> Self {
        Self {
            exam_id: exam.id,
            exam_name: exam.name,
            subject_id: exam.subject.id,
            subject_name: exam.subject.name,
        }
    }
}

impl Display for RejectedExam {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "exam `{}` ({}) requires enrollment in subject `{}` ({})",
            self.exam_name, self.exam_id, self.subject_name, self.subject_id
        )
    }
}

/// Result of filtering requested exams against a subject set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExamEligibility {
    /// Existing exam set unioned with the accepted exams.
    pub merged: BTreeSet<ExamId>,
    /// Eligible exams, in request order.
    pub accepted: Vec<Exam>,
    /// Requested ids with no stored exam, in request order, each once.
    pub not_found: Vec<ExamId>,
    /// Existing but ineligible exams, in request order.
    pub rejected: Vec<RejectedExam>,
}

impl ExamEligibility {
    fn unchanged(existing: &BTreeSet<ExamId>) -> Self {
        Self {
            merged: existing.clone(),
            accepted: Vec::new(),
            not_found: Vec::new(),
            rejected: Vec::new(),
        }
    }

    /// Distinct subjects that caused a rejection, in first-seen order.
    pub fn rejected_subjects(&self) -> Vec<Subject> {
        rejected_subjects(&self.rejected)
    }
}

/// Resolves `requested` exams and partitions them by subject enrollment.
///
/// An empty request is a no-op and does not touch the store.
pub fn filter_exams<S: EnrollmentStore + ?Sized>(
    store: &S,
    student_subjects: &BTreeSet<SubjectId>,
    existing_exams: &BTreeSet<ExamId>,
    requested: &[ExamId],
) -> RepoResult<ExamEligibility> {
    if requested.is_empty() {
        return Ok(ExamEligibility::unchanged(existing_exams));
    }

    let ids = dedupe_preserving_order(requested);
    let found = store.find_exams_by_ids(&ids)?;
    Ok(partition(student_subjects, existing_exams, &ids, found))
}

fn partition(
    student_subjects: &BTreeSet<SubjectId>,
    existing_exams: &BTreeSet<ExamId>,
    requested: &[ExamId],
    found: Vec<Exam>,
) -> ExamEligibility {
    let mut by_id: HashMap<ExamId, Exam> = found.into_iter().map(|exam| (exam.id, exam)).collect();

    let mut outcome = ExamEligibility::unchanged(existing_exams);
    for id in requested {
        match by_id.remove(id) {
            None => outcome.not_found.push(*id),
            Some(exam) if student_subjects.contains(&exam.subject_id()) => {
                outcome.merged.insert(exam.id);
                outcome.accepted.push(exam);
            }
            Some(exam) => outcome.rejected.push(RejectedExam::from_exam(exam)),
        }
    }
    outcome
}

pub(crate) fn rejected_subjects(rejected: &[RejectedExam]) -> Vec<Subject> {
    let mut seen = BTreeSet::new();
    rejected
        .iter()
        .filter(|entry| seen.insert(entry.subject_id))
        .map(|entry| Subject {
            id: entry.subject_id,
            name: entry.subject_name.clone(),
        })
        .collect()
}
