//! Subject use-case service.

use crate::model::subject::{Subject, SubjectId};
use crate::model::EntityKind;
use crate::repo::subject_repo::SubjectRepository;
use crate::service::error::{ServiceError, ServiceResult};
use crate::service::CrudService;
use log::info;

pub struct SubjectService<R: SubjectRepository> {
    repo: R,
}

impl<R: SubjectRepository> SubjectService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates several subjects atomically; a blank name rejects the batch.
    pub fn create_many(&self, names: &[String]) -> ServiceResult<Vec<Subject>> {
        let subjects = names
            .iter()
            .map(|name| Subject::new(name))
            .collect::<Result<Vec<_>, _>>()?;
        self.repo.create_subjects(&subjects)?;
        info!(
            "event=subject_create module=service status=ok count={}",
            subjects.len()
        );
        Ok(subjects)
    }
}

impl<R: SubjectRepository> CrudService for SubjectService<R> {
    type Record = Subject;
    type Id = SubjectId;
    type Draft = String;
    type Patch = String;

    fn create(&self, name: String) -> ServiceResult<Subject> {
        let subject = Subject::new(&name)?;
        self.repo.create_subject(&subject)?;
        info!(
            "event=subject_create module=service status=ok subject_id={}",
            subject.id
        );
        Ok(subject)
    }

    fn get(&self, id: SubjectId) -> ServiceResult<Subject> {
        self.repo
            .get_subject(id)?
            .ok_or_else(|| ServiceError::not_found(EntityKind::Subject, id))
    }

    fn list(&self) -> ServiceResult<Vec<Subject>> {
        Ok(self.repo.list_subjects()?)
    }

    fn update(&self, id: SubjectId, name: String) -> ServiceResult<Subject> {
        let subject = Subject::with_id(id, &name)?;
        self.repo.update_subject(&subject)?;
        Ok(subject)
    }

    fn delete(&self, id: SubjectId) -> ServiceResult<()> {
        self.repo.delete_subject(id)?;
        info!("event=subject_delete module=service status=ok subject_id={id}");
        Ok(())
    }
}
