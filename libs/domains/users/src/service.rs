use async_trait::async_trait;
use domain_core::{DomainService, RepositoryProvider, ResourceService, ServiceResult};
use tracing::info;
use uuid::Uuid;

use crate::models::{User, UserClaim, UserLogin, UserRole};
use crate::resource::UserMapper;

pub type UserService<U> = DomainService<User, U>;

pub type UserResourceService<U> = ResourceService<User, U, UserMapper>;

/// Account operations on stored users.
///
/// Each loads the user, applies the change and saves it through
/// [`DomainService::update`]. A change that is already in effect returns the
/// stored user without writing.
#[async_trait]
pub trait UserCommands {
    async fn confirm_email(&self, id: Uuid) -> ServiceResult<User>;

    async fn set_active(&self, id: Uuid, is_active: bool) -> ServiceResult<User>;

    async fn grant_role(&self, id: Uuid, role: UserRole) -> ServiceResult<User>;

    async fn grant_claim(&self, id: Uuid, claim: UserClaim) -> ServiceResult<User>;

    async fn link_login(&self, id: Uuid, login: UserLogin) -> ServiceResult<User>;
}

async fn modify<U, F>(service: &UserService<U>, id: Uuid, change: F) -> ServiceResult<User>
where
    U: RepositoryProvider<User>,
    F: FnOnce(&mut User) -> bool + Send,
{
    let mut user = service.get_by_id(id).await?;
    if !change(&mut user) {
        return Ok(user);
    }
    service.update(user).await
}

#[async_trait]
impl<U> UserCommands for UserService<U>
where
    U: RepositoryProvider<User>,
{
    async fn confirm_email(&self, id: Uuid) -> ServiceResult<User> {
        modify(self, id, |user| {
            let changed = !user.is_email_confirmed();
            user.confirm_email();
            changed
        })
        .await
    }

    async fn set_active(&self, id: Uuid, is_active: bool) -> ServiceResult<User> {
        let mut changed = false;
        let user = modify(self, id, |user| {
            changed = user.is_active() != is_active;
            if is_active {
                user.activate();
            } else {
                user.deactivate();
            }
            changed
        })
        .await?;

        if changed {
            info!(user_id = %id, is_active, "User activation changed");
        }
        Ok(user)
    }

    async fn grant_role(&self, id: Uuid, role: UserRole) -> ServiceResult<User> {
        modify(self, id, |user| user.add_role(role)).await
    }

    async fn grant_claim(&self, id: Uuid, claim: UserClaim) -> ServiceResult<User> {
        modify(self, id, |user| user.add_claim(claim)).await
    }

    async fn link_login(&self, id: Uuid, login: UserLogin) -> ServiceResult<User> {
        modify(self, id, |user| user.add_login(login)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserBuilder;
    use domain_core::memory::InMemoryUnitOfWork;
    use domain_core::{Builder, DomainEntity, ServiceError};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

    /// Counts INFO events emitted by this module.
    #[derive(Clone, Default)]
    struct InfoEvents(Arc<AtomicUsize>);

    impl<S: Subscriber> Layer<S> for InfoEvents {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            let metadata = event.metadata();
            if *metadata.level() == Level::INFO && metadata.target() == module_path!() {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    fn user(email: &str) -> User {
        UserBuilder::default()
            .with_new_id()
            .with_name("Ada")
            .with_email(email)
            .with_password_hash("$argon2id$hash")
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_confirm_email_is_saved() {
        let service = UserService::new(InMemoryUnitOfWork::new());
        let created = service.create(user("ada@example.com")).await.unwrap();

        let confirmed = service.confirm_email(created.id()).await.unwrap();

        assert!(confirmed.is_email_confirmed());
        assert!(service.get_by_id(created.id()).await.unwrap().is_email_confirmed());
    }

    #[tokio::test]
    async fn test_unchanged_state_skips_the_write() {
        let uow = InMemoryUnitOfWork::new();
        let service = UserService::new(uow.clone());
        let created = service.create(user("ada@example.com")).await.unwrap();
        service.grant_role(created.id(), UserRole::new("admin")).await.unwrap();
        let commits = uow.counts().commits;

        let same = service.grant_role(created.id(), UserRole::new("admin")).await.unwrap();
        service.set_active(created.id(), true).await.unwrap();

        assert!(same.has_role("admin"));
        assert_eq!(uow.counts().commits, commits);
    }

    #[tokio::test]
    async fn test_activation_is_logged_only_when_it_changes() {
        let events = InfoEvents::default();
        let _guard = tracing::subscriber::set_default(tracing_subscriber::registry().with(events.clone()));
        let uow = InMemoryUnitOfWork::new();
        let service = UserService::new(uow.clone());
        let created = service.create(user("ada@example.com")).await.unwrap();
        let commits = uow.counts().commits;

        service.set_active(created.id(), true).await.unwrap();
        assert_eq!(events.0.load(Ordering::SeqCst), 0);
        assert_eq!(uow.counts().commits, commits);

        service.set_active(created.id(), false).await.unwrap();
        assert_eq!(events.0.load(Ordering::SeqCst), 1);
        assert_eq!(uow.counts().commits, commits + 1);
    }

    #[tokio::test]
    async fn test_deactivate_then_link_login() {
        let service = UserService::new(InMemoryUnitOfWork::new());
        let created = service.create(user("ada@example.com")).await.unwrap();

        service.set_active(created.id(), false).await.unwrap();
        service
            .grant_claim(created.id(), UserClaim::new("scope", "read"))
            .await
            .unwrap();
        let stored = service
            .link_login(created.id(), UserLogin::new("github", "42"))
            .await
            .unwrap();

        assert!(!stored.is_active());
        assert_eq!(stored.claims().len(), 1);
        assert_eq!(stored.logins().len(), 1);
        assert_eq!(stored.created_at(), created.created_at());
    }

    #[tokio::test]
    async fn test_commands_on_missing_user() {
        let service = UserService::new(InMemoryUnitOfWork::<User>::new());

        let err = service.confirm_email(Uuid::new_v4()).await.unwrap_err();

        assert!(matches!(err, ServiceError::EntityDoesNotExist { entity: "User", .. }));
    }
}
