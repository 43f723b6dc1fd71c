use std::collections::HashMap;

use async_trait::async_trait;
use database::{DatabaseResult, SeaOrmUnitOfWork, with_executor};
use domain_core::{DomainEntity, Repository, RepositoryProvider, Timestamps};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};
use uuid::Uuid;

use crate::entity::{ChildRows, UserChildren, UserRows, user_claims, user_logins, user_roles, users};
use crate::models::User;

/// User repository bound to a [`SeaOrmUnitOfWork`].
///
/// Writes go to the user row and replace every child row, so they belong in
/// a transaction; the domain service always opens one.
#[derive(Clone)]
pub struct PgUserRepository {
    uow: SeaOrmUnitOfWork,
}

impl PgUserRepository {
    pub fn new(uow: SeaOrmUnitOfWork) -> Self {
        Self { uow }
    }
}

async fn insert_children<C: ConnectionTrait>(db: &C, rows: ChildRows) -> Result<(), DbErr> {
    if !rows.claims.is_empty() {
        user_claims::Entity::insert_many(rows.claims)
            .exec_without_returning(db)
            .await?;
    }
    if !rows.roles.is_empty() {
        user_roles::Entity::insert_many(rows.roles)
            .exec_without_returning(db)
            .await?;
    }
    if !rows.logins.is_empty() {
        user_logins::Entity::insert_many(rows.logins)
            .exec_without_returning(db)
            .await?;
    }
    Ok(())
}

async fn delete_children<C: ConnectionTrait>(db: &C, user_id: Uuid) -> Result<(), DbErr> {
    user_claims::Entity::delete_many()
        .filter(user_claims::Column::UserId.eq(user_id))
        .exec(db)
        .await?;
    user_roles::Entity::delete_many()
        .filter(user_roles::Column::UserId.eq(user_id))
        .exec(db)
        .await?;
    user_logins::Entity::delete_many()
        .filter(user_logins::Column::UserId.eq(user_id))
        .exec(db)
        .await?;
    Ok(())
}

async fn insert_user<C: ConnectionTrait>(db: &C, rows: UserRows) -> Result<users::Model, DbErr> {
    let inserted = rows.user.insert(db).await?;
    insert_children(db, rows.children).await?;
    Ok(inserted)
}

async fn update_user<C: ConnectionTrait>(db: &C, rows: UserRows) -> Result<users::Model, DbErr> {
    let updated = rows.user.update(db).await?;
    delete_children(db, updated.id).await?;
    insert_children(db, rows.children).await?;
    Ok(updated)
}

async fn load_children<C: ConnectionTrait>(
    db: &C,
    user_ids: &[Uuid],
) -> Result<HashMap<Uuid, UserChildren>, DbErr> {
    let mut children: HashMap<Uuid, UserChildren> = HashMap::new();

    let claims = user_claims::Entity::find()
        .filter(user_claims::Column::UserId.is_in(user_ids.iter().copied()))
        .all(db)
        .await?;
    for claim in claims {
        children.entry(claim.user_id).or_default().claims.push(claim);
    }

    let roles = user_roles::Entity::find()
        .filter(user_roles::Column::UserId.is_in(user_ids.iter().copied()))
        .all(db)
        .await?;
    for role in roles {
        children.entry(role.user_id).or_default().roles.push(role);
    }

    let logins = user_logins::Entity::find()
        .filter(user_logins::Column::UserId.is_in(user_ids.iter().copied()))
        .all(db)
        .await?;
    for login in logins {
        children.entry(login.user_id).or_default().logins.push(login);
    }

    Ok(children)
}

async fn load_users<C: ConnectionTrait>(db: &C, models: Vec<users::Model>) -> Result<Vec<User>, DbErr> {
    if models.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();
    let mut children = load_children(db, &ids).await?;

    Ok(models
        .into_iter()
        .map(|model| {
            let rows = children.remove(&model.id).unwrap_or_default();
            User::from_rows(model, rows)
        })
        .collect())
}

/// The written user with the timestamps the store returned.
fn as_stored(user: User, row: &users::Model) -> User {
    User::restore(
        row.id,
        user.data().clone(),
        Timestamps::restored(row.created_at.into(), row.updated_at.into()),
    )
}

#[async_trait]
impl Repository<User> for PgUserRepository {
    async fn add(&self, user: User) -> DatabaseResult<User> {
        let rows = UserRows::try_from(&user)?;

        let guard = self.uow.executor().await;
        let inserted = with_executor!(guard, |db| insert_user(db, rows).await)?;

        tracing::debug!(user_id = %inserted.id, "Inserted user");
        Ok(as_stored(user, &inserted))
    }

    async fn update(&self, user: User) -> DatabaseResult<User> {
        let rows = UserRows::try_from(&user)?;

        let guard = self.uow.executor().await;
        let updated = with_executor!(guard, |db| update_user(db, rows).await)?;

        Ok(as_stored(user, &updated))
    }

    /// Child rows go with the user through the cascading foreign keys.
    async fn delete(&self, user: &User) -> DatabaseResult<bool> {
        let id = user.id();

        let guard = self.uow.executor().await;
        let result = with_executor!(guard, |db| users::Entity::delete_by_id(id).exec(db).await)?;

        Ok(result.rows_affected > 0)
    }

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<User>> {
        let guard = self.uow.executor().await;
        let users = with_executor!(guard, |db| {
            match users::Entity::find_by_id(id).one(db).await {
                Ok(model) => load_users(db, model.into_iter().collect()).await,
                Err(e) => Err(e),
            }
        })?;

        Ok(users.into_iter().next())
    }

    async fn list(&self) -> DatabaseResult<Vec<User>> {
        let guard = self.uow.executor().await;
        let users = with_executor!(guard, |db| {
            match users::Entity::find()
                .order_by_asc(users::Column::CreatedAt)
                .order_by_asc(users::Column::Id)
                .all(db)
                .await
            {
                Ok(models) => load_users(db, models).await,
                Err(e) => Err(e),
            }
        })?;

        Ok(users)
    }

    async fn exists(&self, id: Uuid) -> DatabaseResult<bool> {
        let guard = self.uow.executor().await;
        let count = with_executor!(guard, |db| users::Entity::find_by_id(id).count(db).await)?;

        Ok(count > 0)
    }
}

impl RepositoryProvider<User> for SeaOrmUnitOfWork {
    type Repository = PgUserRepository;

    fn repository(&self) -> PgUserRepository {
        PgUserRepository::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{UserBuilder, UserLogin, UserRole};
    use domain_core::Builder;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn stamped_user() -> User {
        let mut user = UserBuilder::default()
            .with_new_id()
            .with_name("Ada")
            .with_email("ada@example.com")
            .with_password_hash("$argon2id$hash")
            .build()
            .unwrap();
        user.update_time_stamps();
        user
    }

    fn model_of(user: &User) -> users::Model {
        let (created_at, updated_at) = user.timestamps().persisted().unwrap();
        users::Model {
            id: user.id(),
            user_name: user.user_name().to_string(),
            email: user.email().to_string(),
            password: user.password_hash().to_string(),
            name: user.name().to_string(),
            is_active: user.is_active(),
            is_deleted: user.is_deleted(),
            is_email_confirmed: user.is_email_confirmed(),
            is_two_factor_authentication_enabled: user.is_two_factor_authentication_enabled(),
            security_stamp: user.security_stamp().to_string(),
            created_at: created_at.into(),
            updated_at: updated_at.into(),
        }
    }

    fn exec(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }
    }

    #[tokio::test]
    async fn test_add_writes_user_and_children() {
        let mut user = stamped_user();
        user.add_role(UserRole::new("admin"));
        user.add_login(UserLogin::new("github", "42"));

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![model_of(&user)]])
            .append_exec_results([exec(1), exec(1)])
            .into_connection();
        let repo = PgUserRepository::new(SeaOrmUnitOfWork::new(db.clone()));

        let inserted = repo.add(user.clone()).await.unwrap();
        assert_eq!(inserted, user);

        let log = db.into_transaction_log();
        assert_eq!(log.len(), 3);
    }

    #[tokio::test]
    async fn test_update_replaces_children() {
        let mut user = stamped_user();
        user.add_role(UserRole::new("admin"));

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![model_of(&user)]])
            .append_exec_results([exec(2), exec(1), exec(0), exec(1)])
            .into_connection();
        let repo = PgUserRepository::new(SeaOrmUnitOfWork::new(db.clone()));

        let updated = repo.update(user.clone()).await.unwrap();
        assert!(updated.has_role("admin"));

        // update, three child deletes, one role insert
        assert_eq!(db.into_transaction_log().len(), 5);
    }

    #[tokio::test]
    async fn test_find_by_id_loads_children() {
        let user = stamped_user();
        let (_, updated_at) = user.timestamps().persisted().unwrap();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![model_of(&user)]])
            .append_query_results([Vec::<user_claims::Model>::new()])
            .append_query_results([vec![user_roles::Model {
                user_id: user.id(),
                role: "admin".to_string(),
                created_at: updated_at.into(),
            }]])
            .append_query_results([vec![user_logins::Model {
                user_id: user.id(),
                login_provider: "github".to_string(),
                provider_key: "42".to_string(),
                created_at: updated_at.into(),
            }]])
            .into_connection();
        let repo = PgUserRepository::new(SeaOrmUnitOfWork::new(db));

        let found = repo.find_by_id(user.id()).await.unwrap().unwrap();

        assert_eq!(found.email(), "ada@example.com");
        assert!(found.has_role("admin"));
        assert!(found.logins().contains(&UserLogin::new("github", "42")));
        assert!(found.claims().is_empty());
    }

    #[tokio::test]
    async fn test_find_by_id_absent_skips_child_queries() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<users::Model>::new()])
            .into_connection();
        let repo = PgUserRepository::new(SeaOrmUnitOfWork::new(db.clone()));

        assert!(repo.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
        assert_eq!(db.into_transaction_log().len(), 1);
    }

    #[tokio::test]
    async fn test_add_rejects_unstamped_user() {
        let user = UserBuilder::default()
            .with_new_id()
            .with_name("Ada")
            .with_email("ada@example.com")
            .with_password_hash("hash")
            .build()
            .unwrap();
        let repo = PgUserRepository::new(SeaOrmUnitOfWork::new(
            MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
        ));

        assert!(repo.add(user).await.is_err());
    }

    #[tokio::test]
    async fn test_delete_reports_rows_affected() {
        let user = stamped_user();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([exec(1), exec(0)])
            .into_connection();
        let repo = PgUserRepository::new(SeaOrmUnitOfWork::new(db));

        assert!(repo.delete(&user).await.unwrap());
        assert!(!repo.delete(&user).await.unwrap());
    }
}
