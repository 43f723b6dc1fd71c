use async_trait::async_trait;
use database::{DatabaseResult, SeaOrmUnitOfWork, with_executor};
use domain_core::{DomainEntity, Repository, RepositoryProvider};
use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, QueryOrder};
use uuid::Uuid;

use crate::{entity, models::Project};

/// Project repository bound to a [`SeaOrmUnitOfWork`].
#[derive(Clone)]
pub struct PgProjectRepository {
    uow: SeaOrmUnitOfWork,
}

impl PgProjectRepository {
    pub fn new(uow: SeaOrmUnitOfWork) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl Repository<Project> for PgProjectRepository {
    async fn add(&self, project: Project) -> DatabaseResult<Project> {
        let model = entity::ActiveModel::try_from(&project)?;

        let guard = self.uow.executor().await;
        let inserted = with_executor!(guard, |db| model.insert(db).await)?;

        tracing::debug!(project_id = %inserted.id, "Inserted project");
        Ok(inserted.into())
    }

    async fn update(&self, project: Project) -> DatabaseResult<Project> {
        let model = entity::ActiveModel::try_from(&project)?;

        let guard = self.uow.executor().await;
        let updated = with_executor!(guard, |db| model.update(db).await)?;

        Ok(updated.into())
    }

    async fn delete(&self, project: &Project) -> DatabaseResult<bool> {
        let id = project.id();

        let guard = self.uow.executor().await;
        let result = with_executor!(guard, |db| entity::Entity::delete_by_id(id).exec(db).await)?;

        Ok(result.rows_affected > 0)
    }

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<Project>> {
        let guard = self.uow.executor().await;
        let model = with_executor!(guard, |db| entity::Entity::find_by_id(id).one(db).await)?;

        Ok(model.map(Into::into))
    }

    async fn list(&self) -> DatabaseResult<Vec<Project>> {
        let guard = self.uow.executor().await;
        let models = with_executor!(guard, |db| {
            entity::Entity::find()
                .order_by_asc(entity::Column::CreatedAt)
                .order_by_asc(entity::Column::Id)
                .all(db)
                .await
        })?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn exists(&self, id: Uuid) -> DatabaseResult<bool> {
        let guard = self.uow.executor().await;
        let count = with_executor!(guard, |db| entity::Entity::find_by_id(id).count(db).await)?;

        Ok(count > 0)
    }
}

impl RepositoryProvider<Project> for SeaOrmUnitOfWork {
    type Repository = PgProjectRepository;

    fn repository(&self) -> PgProjectRepository {
        PgProjectRepository::new(self.clone())
    }
}
