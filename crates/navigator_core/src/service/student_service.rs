//! Student use-case service.
//!
//! Covers identity and name only. Enrollment changes go through
//! `enrollment::reconcile::EnrollmentService`.

use crate::model::exam::ExamId;
use crate::model::normalize_name;
use crate::model::student::{Student, StudentId};
use crate::model::subject::SubjectId;
use crate::model::EntityKind;
use crate::repo::student_repo::StudentRepository;
use crate::service::error::{ServiceError, ServiceResult};
use crate::service::CrudService;
use log::info;

pub struct StudentService<R: StudentRepository> {
    repo: R,
}

impl<R: StudentRepository> StudentService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Students enrolled in `subject_id`.
    pub fn list_students_in_subject(&self, subject_id: SubjectId) -> ServiceResult<Vec<Student>> {
        Ok(self.repo.list_students_by_subject(subject_id)?)
    }

    /// Students enrolled in `exam_id`.
    pub fn list_students_in_exam(&self, exam_id: ExamId) -> ServiceResult<Vec<Student>> {
        Ok(self.repo.list_students_by_exam(exam_id)?)
    }
}

impl<R: StudentRepository> CrudService for StudentService<R> {
    type Record = Student;
    type Id = StudentId;
    /// Optional display name.
    type Draft = Option<String>;
    /// New name; `None` or blank keeps the current one.
    type Patch = Option<String>;

    fn create(&self, name: Option<String>) -> ServiceResult<Student> {
        let student = Student::new(name.as_deref());
        self.repo.create_student(&student)?;
        info!(
            "event=student_create module=service status=ok student_id={}",
            student.id
        );
        Ok(student)
    }

    fn get(&self, id: StudentId) -> ServiceResult<Student> {
        self.repo
            .get_student(id)?
            .ok_or_else(|| ServiceError::not_found(EntityKind::Student, id))
    }

    fn list(&self) -> ServiceResult<Vec<Student>> {
        Ok(self.repo.list_students()?)
    }

    fn update(&self, id: StudentId, name: Option<String>) -> ServiceResult<Student> {
        if let Some(name) = name.as_deref().and_then(normalize_name) {
            self.repo.rename_student(id, Some(name.as_str()))?;
        }
        self.get(id)
    }

    fn delete(&self, id: StudentId) -> ServiceResult<()> {
        self.repo.delete_student(id)?;
        info!("event=student_delete module=service status=ok student_id={id}");
        Ok(())
    }
}
