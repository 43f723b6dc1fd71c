//! Building blocks shared by every domain crate.
//!
//! - [`entity`]: [`DomainEntity`] identity, [`Timestamps`] and the field merge used by updates
//! - [`builder`]: validated construction through [`Builder`]
//! - [`repository`]: the per-entity [`Repository`] contract and typed resolution from a unit of work
//! - [`service`]: [`DomainService`], the create/update/delete lifecycle around a unit of work
//! - [`resource`]: [`ResourceService`], adapting wire resources to domain entities
//! - [`memory`]: in-memory repository and unit of work
//!
//! Data flows `handler -> ResourceService -> DomainService -> UnitOfWork -> Repository`.

pub mod builder;
pub mod entity;
pub mod error;
pub mod memory;
pub mod repository;
pub mod resource;
pub mod service;
pub mod transaction;

#[cfg(test)]
mod testing;

pub use builder::{Builder, BuilderValidationError, FieldError};
pub use entity::{DomainEntity, Timestamps};
pub use error::{ServiceError, ServiceResult};
pub use repository::{Repository, RepositoryProvider};
pub use resource::{ResourceMapper, ResourceService, parse_resource_id};
pub use service::DomainService;
pub use transaction::in_transaction;

pub use database::{DatabaseError, DatabaseResult, UnitOfWork, UnitOfWorkFactory};
