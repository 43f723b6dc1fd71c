use axum_helpers::ResourceObject;
use domain_core::{Builder, DomainEntity, ResourceMapper, ServiceError, ServiceResult, parse_resource_id};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::{Project, ProjectBuilder};

/// JSON:API resource type of projects.
pub const PROJECT_TYPE: &str = "project";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema, Validate)]
pub struct ProjectAttributes {
    #[serde(default)]
    #[validate(length(max = 256, message = "Description must be at most 256 characters"))]
    #[schema(example = "Migrate billing to the new ledger")]
    pub description: String,
}

/// Wire view of a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectResource {
    pub id: Option<Uuid>,
    pub description: String,
}

impl From<ProjectResource> for ResourceObject<ProjectAttributes> {
    fn from(resource: ProjectResource) -> Self {
        ResourceObject {
            id: resource.id.map(|id| id.to_string()),
            kind: PROJECT_TYPE.to_string(),
            attributes: ProjectAttributes {
                description: resource.description,
            },
        }
    }
}

impl TryFrom<ResourceObject<ProjectAttributes>> for ProjectResource {
    type Error = ServiceError;

    fn try_from(object: ResourceObject<ProjectAttributes>) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_resource_id(object.id.as_deref())?,
            description: object.attributes.description,
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectMapper;

impl ResourceMapper<Project> for ProjectMapper {
    type Resource = ProjectResource;

    fn to_resource(&self, project: &Project) -> ProjectResource {
        ProjectResource {
            id: Some(project.id()),
            description: project.description().to_string(),
        }
    }

    fn resource_id(&self, resource: &ProjectResource) -> Option<Uuid> {
        resource.id
    }

    fn to_entity(&self, id: Uuid, resource: ProjectResource, _existing: Option<&Project>) -> ServiceResult<Project> {
        Ok(ProjectBuilder::default()
            .with_id(id)
            .with_description(resource.description)
            .build()?)
    }
}
