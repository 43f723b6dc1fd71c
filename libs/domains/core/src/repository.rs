use async_trait::async_trait;
use database::{DatabaseResult, UnitOfWork};
use std::sync::Arc;

use crate::entity::DomainEntity;

/// Persistence operations for one entity type.
///
/// A repository is bound to a unit of work: while that unit of work has a
/// transaction open, every call runs inside it.
#[async_trait]
pub trait Repository<T: DomainEntity>: Send + Sync {
    /// Stores a new entity. The store rejects a duplicate id.
    async fn add(&self, entity: T) -> DatabaseResult<T>;

    /// Overwrites the stored entity with the same id.
    async fn update(&self, entity: T) -> DatabaseResult<T>;

    /// Removes the entity. Returns `false` when nothing was stored under its id.
    async fn delete(&self, entity: &T) -> DatabaseResult<bool>;

    async fn find_by_id(&self, id: T::Id) -> DatabaseResult<Option<T>>;

    async fn list(&self) -> DatabaseResult<Vec<T>>;

    async fn exists(&self, id: T::Id) -> DatabaseResult<bool> {
        Ok(self.find_by_id(id).await?.is_some())
    }
}

#[async_trait]
impl<T: DomainEntity, R: Repository<T> + ?Sized> Repository<T> for Arc<R> {
    async fn add(&self, entity: T) -> DatabaseResult<T> {
        (**self).add(entity).await
    }

    async fn update(&self, entity: T) -> DatabaseResult<T> {
        (**self).update(entity).await
    }

    async fn delete(&self, entity: &T) -> DatabaseResult<bool> {
        (**self).delete(entity).await
    }

    async fn find_by_id(&self, id: T::Id) -> DatabaseResult<Option<T>> {
        (**self).find_by_id(id).await
    }

    async fn list(&self) -> DatabaseResult<Vec<T>> {
        (**self).list().await
    }

    async fn exists(&self, id: T::Id) -> DatabaseResult<bool> {
        (**self).exists(id).await
    }
}

/// A unit of work that can hand out a repository for `T`.
///
/// Resolution is checked at compile time: a service over `T` only accepts a
/// unit of work that implements `RepositoryProvider<T>`.
pub trait RepositoryProvider<T: DomainEntity>: UnitOfWork {
    type Repository: Repository<T> + 'static;

    fn repository(&self) -> Self::Repository;
}
