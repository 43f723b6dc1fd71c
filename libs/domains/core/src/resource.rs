//! Adapts wire resources to domain entities.
//!
//! A [`ResourceMapper`] converts in both directions; [`ResourceService`] runs
//! the mapping around a [`DomainService`]. Failures are logged once here and
//! returned unchanged so the HTTP layer maps the original error.

use std::future::Future;
use tracing::{error, warn};
use uuid::Uuid;

use crate::entity::DomainEntity;
use crate::error::{ServiceError, ServiceResult};
use crate::repository::RepositoryProvider;
use crate::service::DomainService;

pub trait ResourceMapper<T: DomainEntity>: Send + Sync {
    type Resource: Send;

    fn to_resource(&self, entity: &T) -> Self::Resource;

    /// The id carried by the resource, if the client sent one.
    fn resource_id(&self, resource: &Self::Resource) -> Option<T::Id>;

    /// Builds the entity `resource` describes under `id`.
    ///
    /// `existing` is the stored entity when updating, so fields the resource
    /// does not carry can be kept.
    fn to_entity(&self, id: T::Id, resource: Self::Resource, existing: Option<&T>) -> ServiceResult<T>;
}

/// Fails with the id-mismatch error unless the body carries the path id.
pub fn ensure_matching_id<I: PartialEq>(path_id: I, resource_id: Option<I>) -> ServiceResult<()> {
    match resource_id {
        Some(id) if id == path_id => Ok(()),
        _ => Err(ServiceError::id_mismatch()),
    }
}

/// Parses the `id` of a JSON:API resource object, if one was sent.
pub fn parse_resource_id(id: Option<&str>) -> ServiceResult<Option<Uuid>> {
    id.map(|raw| {
        Uuid::parse_str(raw).map_err(|_| {
            ServiceError::invalid_argument("id", format!("Resource id '{}' is not a valid UUID.", raw))
        })
    })
    .transpose()
}

pub struct ResourceService<T, U, M> {
    service: DomainService<T, U>,
    mapper: M,
}

impl<T, U, M> ResourceService<T, U, M>
where
    T: DomainEntity,
    U: RepositoryProvider<T>,
    M: ResourceMapper<T>,
{
    pub fn new(uow: U, mapper: M) -> Self {
        Self::from_service(DomainService::new(uow), mapper)
    }

    pub fn from_service(service: DomainService<T, U>, mapper: M) -> Self {
        Self { service, mapper }
    }

    pub fn domain_service(&self) -> &DomainService<T, U> {
        &self.service
    }

    pub fn mapper(&self) -> &M {
        &self.mapper
    }

    pub async fn get_all(&self) -> ServiceResult<Vec<M::Resource>> {
        self.perform("get_all", async {
            let entities = self.service.get_all().await?;
            Ok(entities.iter().map(|e| self.mapper.to_resource(e)).collect())
        })
        .await
    }

    pub async fn get(&self, id: T::Id) -> ServiceResult<M::Resource> {
        self.perform("get", async {
            let entity = self.service.get_by_id(id).await?;
            Ok(self.mapper.to_resource(&entity))
        })
        .await
    }

    /// Creates the entity under the client-supplied id, or a generated one.
    pub async fn create(&self, resource: M::Resource) -> ServiceResult<M::Resource> {
        self.perform("create", async {
            let id = self
                .mapper
                .resource_id(&resource)
                .unwrap_or_else(T::generate_id);
            let entity = self.mapper.to_entity(id, resource, None)?;
            let created = self.service.create(entity).await?;
            Ok(self.mapper.to_resource(&created))
        })
        .await
    }

    /// The resource must carry `id`; the check runs before the domain service is touched.
    pub async fn update(&self, id: T::Id, resource: M::Resource) -> ServiceResult<M::Resource> {
        self.perform("update", async {
            ensure_matching_id(id, self.mapper.resource_id(&resource))?;

            let existing = self.service.get_by_id(id).await?;
            let entity = self.mapper.to_entity(id, resource, Some(&existing))?;
            let updated = self.service.update(entity).await?;
            Ok(self.mapper.to_resource(&updated))
        })
        .await
    }

    pub async fn delete(&self, id: T::Id) -> ServiceResult<bool> {
        self.perform("delete", self.service.delete(id)).await
    }

    async fn perform<R>(
        &self,
        operation: &'static str,
        work: impl Future<Output = ServiceResult<R>>,
    ) -> ServiceResult<R> {
        work.await.inspect_err(|err| {
            if err.is_store() {
                error!(entity = T::TYPE_NAME, operation, error = %err, "Resource operation failed");
            } else {
                warn!(entity = T::TYPE_NAME, operation, error = %err, "Resource operation rejected");
            }
        })
    }
}
