//! Per-entity use-case services.
//!
//! # Responsibility
//! - Wrap each repository in a small service with uniform
//!   create/get/list/update/delete entry points.
//! - Turn missing direct-by-id targets into `ServiceError::NotFound`.
//!
//! # Invariants
//! - Services never write enrollment sets; that is the enrollment engine's
//!   job.
//! - Only the exam service reaches across entities, and only to resolve and
//!   guard the exam's subject link.

pub mod error;
pub mod exam_service;
pub mod student_service;
pub mod subject_service;

use crate::service::error::ServiceResult;

/// Uniform CRUD capability shared by the entity services.
pub trait CrudService {
    type Record;
    type Id: Copy;
    /// Input for `create`.
    type Draft;
    /// Input for `update`.
    type Patch;

    fn create(&self, draft: Self::Draft) -> ServiceResult<Self::Record>;
    /// Fails with `NotFound` when `id` is unknown.
    fn get(&self, id: Self::Id) -> ServiceResult<Self::Record>;
    fn list(&self) -> ServiceResult<Vec<Self::Record>>;
    /// Fails with `NotFound` when `id` is unknown.
    fn update(&self, id: Self::Id, patch: Self::Patch) -> ServiceResult<Self::Record>;
    /// Fails with `NotFound` when `id` is unknown.
    fn delete(&self, id: Self::Id) -> ServiceResult<()>;
}
