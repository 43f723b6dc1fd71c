use domain_core::builder::validate_not_nil;
use domain_core::{Builder, DomainEntity, Timestamps};
use uuid::Uuid;
use validator::Validate;

/// Updatable fields of a [`Project`].
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct ProjectData {
    #[validate(length(min = 1, message = "Description must not be empty"))]
    pub description: String,
}

/// A project. Built through [`ProjectBuilder`].
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct Project {
    #[validate(custom(function = "validate_not_nil"))]
    id: Uuid,
    timestamps: Timestamps,
    #[validate(nested)]
    data: ProjectData,
}

impl Project {
    pub fn description(&self) -> &str {
        &self.data.description
    }

    /// A project read back from storage; skips validation.
    pub(crate) fn restore(id: Uuid, description: String, timestamps: Timestamps) -> Self {
        Self {
            id,
            timestamps,
            data: ProjectData { description },
        }
    }
}

impl DomainEntity for Project {
    type Id = Uuid;
    type Data = ProjectData;

    const TYPE_NAME: &'static str = "Project";

    fn id(&self) -> Uuid {
        self.id
    }

    fn generate_id() -> Uuid {
        Uuid::now_v7()
    }

    fn timestamps(&self) -> &Timestamps {
        &self.timestamps
    }

    fn timestamps_mut(&mut self) -> &mut Timestamps {
        &mut self.timestamps
    }

    fn data(&self) -> &ProjectData {
        &self.data
    }

    fn data_mut(&mut self) -> &mut ProjectData {
        &mut self.data
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProjectBuilder {
    id: Option<Uuid>,
    description: Option<String>,
}

impl ProjectBuilder {
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_new_id(self) -> Self {
        self.with_id(Project::generate_id())
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl Builder for ProjectBuilder {
    type Output = Project;

    fn do_build(self) -> Project {
        Project {
            id: self.id.unwrap_or_default(),
            timestamps: Timestamps::new(),
            data: ProjectData {
                description: self.description.unwrap_or_default(),
            },
        }
    }
}
