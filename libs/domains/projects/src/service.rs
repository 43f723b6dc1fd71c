use domain_core::{DomainService, ResourceService};

use crate::models::Project;
use crate::resource::ProjectMapper;

pub type ProjectService<U> = DomainService<Project, U>;

pub type ProjectResourceService<U> = ResourceService<Project, U, ProjectMapper>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProjectBuilder;
    use domain_core::memory::InMemoryUnitOfWork;
    use domain_core::{Builder, DomainEntity, ServiceError};

    fn project(description: &str) -> Project {
        ProjectBuilder::default()
            .with_new_id()
            .with_description(description)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_then_update_keeps_identity() {
        let service = ProjectService::new(InMemoryUnitOfWork::new());
        let created = service.create(project("first")).await.unwrap();

        let replacement = ProjectBuilder::default()
            .with_id(created.id())
            .with_description("second")
            .build()
            .unwrap();
        let updated = service.update(replacement).await.unwrap();

        assert_eq!(updated.id(), created.id());
        assert_eq!(updated.description(), "second");
        assert_eq!(updated.created_at(), created.created_at());
        assert!(updated.updated_at() > created.updated_at());
    }

    #[tokio::test]
    async fn test_create_duplicate_is_rejected() {
        let uow = InMemoryUnitOfWork::new();
        let service = ProjectService::new(uow.clone());
        let created = service.create(project("first")).await.unwrap();
        let commits = uow.counts().commits;

        let err = service.create(created.clone()).await.unwrap_err();

        assert!(matches!(err, ServiceError::EntityAlreadyExists { entity: "Project", .. }));
        assert_eq!(uow.counts().commits, commits);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let service = ProjectService::new(InMemoryUnitOfWork::new());
        let created = service.create(project("first")).await.unwrap();

        assert!(service.delete(created.id()).await.unwrap());
        assert!(!service.delete(created.id()).await.unwrap());
        assert!(service.get_by_id_or_default(created.id()).await.unwrap().is_none());
    }
}
