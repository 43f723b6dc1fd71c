use std::collections::HashSet;
use std::marker::PhantomData;
use tracing::{debug, instrument};

use crate::entity::DomainEntity;
use crate::error::{ServiceError, ServiceResult};
use crate::repository::{Repository, RepositoryProvider};
use crate::transaction::in_transaction;

/// Existence rules and transaction bracketing around one entity's repository.
///
/// - `create` requires the id to be absent and writes in a transaction.
/// - `update` requires the id to be present, merges the updatable fields onto
///   the stored entity and writes in a transaction.
/// - `delete` looks up and removes in one transaction; a missing id is `false`.
/// - reads never open a transaction.
pub struct DomainService<T, U> {
    uow: U,
    _entity: PhantomData<fn() -> T>,
}

impl<T, U: Clone> Clone for DomainService<T, U> {
    fn clone(&self) -> Self {
        Self {
            uow: self.uow.clone(),
            _entity: PhantomData,
        }
    }
}

impl<T, U> DomainService<T, U>
where
    T: DomainEntity,
    U: RepositoryProvider<T>,
{
    pub fn new(uow: U) -> Self {
        Self {
            uow,
            _entity: PhantomData,
        }
    }

    pub fn unit_of_work(&self) -> &U {
        &self.uow
    }

    pub fn repository(&self) -> U::Repository {
        self.uow.repository()
    }

    #[instrument(skip_all, fields(entity = T::TYPE_NAME, id = %entity.id()))]
    pub async fn create(&self, mut entity: T) -> ServiceResult<T> {
        let repository = self.repository();
        let id = entity.id();

        if repository.exists(id).await? {
            return Err(ServiceError::already_exists(T::TYPE_NAME, id));
        }

        entity.update_time_stamps();

        let repository = &repository;
        let created = in_transaction(&self.uow, T::TYPE_NAME, move || async move {
            repository.add(entity).await.map_err(ServiceError::from)
        })
        .await?;

        debug!("Entity created");
        Ok(created)
    }

    #[instrument(skip_all, fields(entity = T::TYPE_NAME, id = %entity.id()))]
    pub async fn update(&self, entity: T) -> ServiceResult<T> {
        let repository = self.repository();
        let id = entity.id();

        let mut persisted = repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::does_not_exist(T::TYPE_NAME, id))?;

        persisted.update_from(&entity);
        persisted.update_time_stamps();

        let repository = &repository;
        let updated = in_transaction(&self.uow, T::TYPE_NAME, move || async move {
            repository.update(persisted).await.map_err(ServiceError::from)
        })
        .await?;

        debug!("Entity updated");
        Ok(updated)
    }

    /// Removes the entity stored under `id`. Returns `false` if there was none.
    #[instrument(skip(self), fields(entity = T::TYPE_NAME))]
    pub async fn delete(&self, id: T::Id) -> ServiceResult<bool> {
        let repository = self.repository();
        let repository = &repository;

        in_transaction(&self.uow, T::TYPE_NAME, move || async move {
            match repository.find_by_id(id).await? {
                Some(entity) => Ok(repository.delete(&entity).await?),
                None => {
                    debug!("Nothing to delete");
                    Ok::<_, ServiceError>(false)
                }
            }
        })
        .await
    }

    /// Inserts every entity in one transaction. Entities sharing an id are
    /// inserted once. If any id is already stored nothing is inserted.
    #[instrument(skip_all, fields(entity = T::TYPE_NAME))]
    pub async fn create_many<I>(&self, entities: I) -> ServiceResult<Vec<T>>
    where
        I: IntoIterator<Item = T>,
    {
        let mut seen = HashSet::new();
        let mut batch: Vec<T> = entities
            .into_iter()
            .filter(|entity| seen.insert(entity.id()))
            .collect();

        for entity in &mut batch {
            entity.update_time_stamps();
        }

        let repository = self.repository();
        let repository = &repository;
        let created = in_transaction(&self.uow, T::TYPE_NAME, move || async move {
            let mut created = Vec::with_capacity(batch.len());
            for entity in batch {
                let id = entity.id();
                if repository.exists(id).await? {
                    return Err(ServiceError::already_exists(T::TYPE_NAME, id));
                }
                created.push(repository.add(entity).await?);
            }
            Ok::<_, ServiceError>(created)
        })
        .await?;

        debug!(count = created.len(), "Entities created");
        Ok(created)
    }

    pub async fn get_all(&self) -> ServiceResult<Vec<T>> {
        Ok(self.repository().list().await?)
    }

    pub async fn get_by_id(&self, id: T::Id) -> ServiceResult<T> {
        self.get_by_id_or_default(id)
            .await?
            .ok_or_else(|| ServiceError::does_not_exist(T::TYPE_NAME, id))
    }

    pub async fn get_by_id_or_default(&self, id: T::Id) -> ServiceResult<Option<T>> {
        Ok(self.repository().find_by_id(id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Widget;
    use async_trait::async_trait;
    use database::{DatabaseError, DatabaseResult, UnitOfWork};
    use mockall::{Sequence, mock, predicate::eq};
    use std::sync::Arc;
    use uuid::Uuid;

    mock! {
        pub Uow {}

        #[async_trait]
        impl UnitOfWork for Uow {
            async fn begin_transaction(&self) -> DatabaseResult<()>;
            async fn commit_transaction(&self) -> DatabaseResult<()>;
            async fn rollback_transaction(&self) -> DatabaseResult<()>;
        }
    }

    mock! {
        pub WidgetRepo {}

        #[async_trait]
        impl Repository<Widget> for WidgetRepo {
            async fn add(&self, entity: Widget) -> DatabaseResult<Widget>;
            async fn update(&self, entity: Widget) -> DatabaseResult<Widget>;
            async fn delete(&self, entity: &Widget) -> DatabaseResult<bool>;
            async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<Widget>>;
            async fn list(&self) -> DatabaseResult<Vec<Widget>>;
            async fn exists(&self, id: Uuid) -> DatabaseResult<bool>;
        }
    }

    /// Pairs a mocked transaction lifecycle with a mocked repository.
    struct ScriptedUow {
        uow: MockUow,
        repository: Arc<MockWidgetRepo>,
    }

    #[async_trait]
    impl UnitOfWork for ScriptedUow {
        async fn begin_transaction(&self) -> DatabaseResult<()> {
            self.uow.begin_transaction().await
        }

        async fn commit_transaction(&self) -> DatabaseResult<()> {
            self.uow.commit_transaction().await
        }

        async fn rollback_transaction(&self) -> DatabaseResult<()> {
            self.uow.rollback_transaction().await
        }
    }

    impl RepositoryProvider<Widget> for ScriptedUow {
        type Repository = Arc<MockWidgetRepo>;

        fn repository(&self) -> Arc<MockWidgetRepo> {
            self.repository.clone()
        }
    }

    fn service(uow: MockUow, repository: MockWidgetRepo) -> DomainService<Widget, ScriptedUow> {
        DomainService::new(ScriptedUow {
            uow,
            repository: Arc::new(repository),
        })
    }

    fn expect_committed_transaction(uow: &mut MockUow, seq: &mut Sequence) {
        uow.expect_begin_transaction()
            .times(1)
            .in_sequence(seq)
            .returning(|| Ok(()));
        uow.expect_commit_transaction()
            .times(1)
            .in_sequence(seq)
            .returning(|| Ok(()));
        uow.expect_rollback_transaction().times(0);
    }

    #[tokio::test]
    async fn test_create_stamps_and_commits() {
        let widget = Widget::new("gear");
        let mut uow = MockUow::new();
        let mut repo = MockWidgetRepo::new();
        let mut seq = Sequence::new();

        repo.expect_exists()
            .with(eq(widget.id()))
            .times(1)
            .returning(|_| Ok(false));
        expect_committed_transaction(&mut uow, &mut seq);
        repo.expect_add()
            .withf(|w| w.created_at().is_some() && w.updated_at().is_some())
            .times(1)
            .returning(Ok);

        let created = service(uow, repo).create(widget.clone()).await.unwrap();

        assert_eq!(created.id(), widget.id());
        assert_eq!(created.label(), "gear");
    }

    #[tokio::test]
    async fn test_create_existing_fails_without_transaction() {
        let widget = Widget::new("gear");
        let mut uow = MockUow::new();
        let mut repo = MockWidgetRepo::new();

        repo.expect_exists().returning(|_| Ok(true));
        repo.expect_add().times(0);
        uow.expect_begin_transaction().times(0);
        uow.expect_commit_transaction().times(0);

        let err = service(uow, repo).create(widget.clone()).await.unwrap_err();

        assert!(matches!(err, ServiceError::EntityAlreadyExists { entity: "Widget", .. }));
        assert_eq!(
            err.to_string(),
            format!("Entity Type Widget with Id {} already exists.", widget.id())
        );
    }

    #[tokio::test]
    async fn test_update_missing_fails_without_transaction() {
        let mut uow = MockUow::new();
        let mut repo = MockWidgetRepo::new();

        repo.expect_find_by_id().returning(|_| Ok(None));
        repo.expect_update().times(0);
        uow.expect_begin_transaction().times(0);
        uow.expect_commit_transaction().times(0);

        let err = service(uow, repo).update(Widget::new("gear")).await.unwrap_err();

        assert!(matches!(err, ServiceError::EntityDoesNotExist { .. }));
    }

    #[tokio::test]
    async fn test_update_merges_fields_and_keeps_created_at() {
        let mut stored = Widget::new("old");
        stored.update_time_stamps();
        let created_at = stored.created_at();
        let updated_at = stored.updated_at().unwrap();

        let incoming = Widget::with_id(stored.id(), "new");

        let mut uow = MockUow::new();
        let mut repo = MockWidgetRepo::new();
        let mut seq = Sequence::new();

        let found = stored.clone();
        repo.expect_find_by_id()
            .with(eq(stored.id()))
            .returning(move |_| Ok(Some(found.clone())));
        expect_committed_transaction(&mut uow, &mut seq);
        repo.expect_update().times(1).returning(Ok);

        let updated = service(uow, repo).update(incoming).await.unwrap();

        assert_eq!(updated.label(), "new");
        assert_eq!(updated.created_at(), created_at);
        assert!(updated.updated_at().unwrap() > updated_at);
    }

    #[tokio::test]
    async fn test_delete_missing_returns_false() {
        let mut uow = MockUow::new();
        let mut repo = MockWidgetRepo::new();
        let mut seq = Sequence::new();

        expect_committed_transaction(&mut uow, &mut seq);
        repo.expect_find_by_id().returning(|_| Ok(None));
        repo.expect_delete().times(0);

        let deleted = service(uow, repo).delete(Uuid::new_v4()).await.unwrap();

        assert!(!deleted);
    }

    #[tokio::test]
    async fn test_delete_existing_within_one_transaction() {
        let widget = Widget::new("gear");
        let mut uow = MockUow::new();
        let mut repo = MockWidgetRepo::new();
        let mut seq = Sequence::new();

        expect_committed_transaction(&mut uow, &mut seq);
        let found = widget.clone();
        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(found.clone())));
        repo.expect_delete()
            .withf(move |w| w.id() == widget.id())
            .times(1)
            .returning(|_| Ok(true));

        let deleted = service(uow, repo).delete(Uuid::new_v4()).await.unwrap();

        assert!(deleted);
    }

    #[tokio::test]
    async fn test_create_many_uses_a_single_transaction() {
        let first = Widget::new("a");
        let second = Widget::new("b");
        let mut uow = MockUow::new();
        let mut repo = MockWidgetRepo::new();
        let mut seq = Sequence::new();

        expect_committed_transaction(&mut uow, &mut seq);
        repo.expect_exists().times(2).returning(|_| Ok(false));
        repo.expect_add()
            .withf(|w| w.created_at().is_some())
            .times(2)
            .returning(Ok);

        let created = service(uow, repo)
            .create_many(vec![first.clone(), second, first])
            .await
            .unwrap();

        assert_eq!(created.len(), 2);
        assert!(created.iter().all(|w| w.updated_at().is_some()));
    }

    #[tokio::test]
    async fn test_create_many_rolls_back_on_conflict() {
        let mut uow = MockUow::new();
        let mut repo = MockWidgetRepo::new();

        uow.expect_begin_transaction().times(1).returning(|| Ok(()));
        uow.expect_commit_transaction().times(0);
        uow.expect_rollback_transaction().times(1).returning(|| Ok(()));

        let mut calls = 0;
        repo.expect_exists().returning(move |_| {
            calls += 1;
            Ok(calls > 1)
        });
        repo.expect_add().times(1).returning(Ok);

        let err = service(uow, repo)
            .create_many(vec![Widget::new("a"), Widget::new("b")])
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::EntityAlreadyExists { .. }));
    }

    #[tokio::test]
    async fn test_failed_commit_rolls_back_and_propagates() {
        let mut uow = MockUow::new();
        let mut repo = MockWidgetRepo::new();

        repo.expect_exists().returning(|_| Ok(false));
        repo.expect_add().returning(Ok);
        uow.expect_begin_transaction().returning(|| Ok(()));
        uow.expect_commit_transaction()
            .returning(|| Err(DatabaseError::Transaction("serialization failure".into())));
        uow.expect_rollback_transaction().times(1).returning(|| Ok(()));

        let err = service(uow, repo).create(Widget::new("gear")).await.unwrap_err();

        assert!(matches!(err, ServiceError::Store(DatabaseError::Transaction(ref m)) if m == "serialization failure"));
    }

    #[tokio::test]
    async fn test_reads_never_open_a_transaction() {
        let widget = Widget::new("gear");
        let mut uow = MockUow::new();
        let mut repo = MockWidgetRepo::new();

        uow.expect_begin_transaction().times(0);
        let listed = widget.clone();
        repo.expect_list().returning(move || Ok(vec![listed.clone()]));
        repo.expect_find_by_id().returning(|_| Ok(None));

        let service = service(uow, repo);

        assert_eq!(service.get_all().await.unwrap().len(), 1);
        assert!(service.get_by_id_or_default(widget.id()).await.unwrap().is_none());
        assert!(matches!(
            service.get_by_id(widget.id()).await.unwrap_err(),
            ServiceError::EntityDoesNotExist { .. }
        ));
    }
}
