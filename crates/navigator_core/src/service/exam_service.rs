//! Exam use-case service and the one-exam-per-subject guard.
//!
//! # Invariants
//! - Create and subject-change paths both go through
//!   [`ensure_subject_available`] before any write.
//! - An exam never conflicts with itself.
//! - A write rejected by the storage unique index also surfaces as
//!   `Conflict`.

use crate::model::exam::{Exam, ExamId};
use crate::model::subject::{Subject, SubjectId};
use crate::model::{normalize_name, require_name, EntityKind};
use crate::repo::exam_repo::ExamRepository;
use crate::repo::subject_repo::SubjectRepository;
use crate::repo::RepoError;
use crate::service::error::{ServiceError, ServiceResult};
use crate::service::CrudService;
use log::{info, warn};
use serde::{Deserialize, Serialize};

/// Input for creating an exam.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewExam {
    pub subject_id: SubjectId,
    pub name: String,
}

/// Partial exam update. `None` fields, and a blank name, keep current values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamPatch {
    pub subject_id: Option<SubjectId>,
    pub name: Option<String>,
}

/// Fails with `Conflict` when an exam other than `updating` owns
/// `subject_id`.
pub fn ensure_subject_available<R: ExamRepository + ?Sized>(
    repo: &R,
    subject_id: SubjectId,
    updating: Option<ExamId>,
) -> ServiceResult<()> {
    match repo.find_exam_by_subject(subject_id)? {
        Some(existing) if Some(existing.id) != updating => {
            warn!(
                "event=exam_guard module=service status=conflict subject_id={subject_id} existing_exam_id={}",
                existing.id
            );
            Err(ServiceError::Conflict {
                subject_id,
                existing_exam_id: existing.id,
            })
        }
        _ => Ok(()),
    }
}

pub struct ExamService<E: ExamRepository, S: SubjectRepository> {
    exams: E,
    subjects: S,
}

impl<E: ExamRepository, S: SubjectRepository> ExamService<E, S> {
    pub fn new(exams: E, subjects: S) -> Self {
        Self { exams, subjects }
    }

    /// Maps a write rejected by the subject index (a concurrent writer took
    /// the subject after the guard ran) to `Conflict`.
    fn lost_subject_race(&self, err: RepoError, exam_id: ExamId) -> ServiceError {
        let RepoError::SubjectTaken(subject_id) = err else {
            return err.into();
        };
        match ensure_subject_available(&self.exams, subject_id, Some(exam_id)) {
            Err(conflict) => conflict,
            Ok(()) => ServiceError::Repo(RepoError::SubjectTaken(subject_id)),
        }
    }

    fn require_subject(&self, subject_id: SubjectId) -> ServiceResult<Subject> {
        self.subjects
            .get_subject(subject_id)?
            .ok_or_else(|| ServiceError::not_found(EntityKind::Subject, subject_id))
    }
}

impl<E: ExamRepository, S: SubjectRepository> CrudService for ExamService<E, S> {
    type Record = Exam;
    type Id = ExamId;
    type Draft = NewExam;
    type Patch = ExamPatch;

    fn create(&self, draft: NewExam) -> ServiceResult<Exam> {
        let name = require_name(EntityKind::Exam, &draft.name)?;
        let subject = self.require_subject(draft.subject_id)?;
        ensure_subject_available(&self.exams, subject.id, None)?;

        let exam = Exam::new(&name, subject)?;
        self.exams
            .create_exam(&exam)
            .map_err(|err| self.lost_subject_race(err, exam.id))?;
        info!(
            "event=exam_create module=service status=ok exam_id={} subject_id={}",
            exam.id,
            exam.subject_id()
        );
        Ok(exam)
    }

    fn get(&self, id: ExamId) -> ServiceResult<Exam> {
        self.exams
            .get_exam(id)?
            .ok_or_else(|| ServiceError::not_found(EntityKind::Exam, id))
    }

    fn list(&self) -> ServiceResult<Vec<Exam>> {
        Ok(self.exams.list_exams()?)
    }

    fn update(&self, id: ExamId, patch: ExamPatch) -> ServiceResult<Exam> {
        let mut exam = self.get(id)?;

        if let Some(subject_id) = patch.subject_id {
            let subject = self.require_subject(subject_id)?;
            ensure_subject_available(&self.exams, subject.id, Some(exam.id))?;
            exam.subject = subject;
        }
        if let Some(name) = patch.name.as_deref().and_then(normalize_name) {
            exam.name = name;
        }

        self.exams
            .update_exam(&exam)
            .map_err(|err| self.lost_subject_race(err, exam.id))?;
        Ok(exam)
    }

    fn delete(&self, id: ExamId) -> ServiceResult<()> {
        self.exams.delete_exam(id)?;
        info!("event=exam_delete module=service status=ok exam_id={id}");
        Ok(())
    }
}
