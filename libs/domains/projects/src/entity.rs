use domain_core::{DomainEntity, Timestamps};
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;

use crate::models::Project;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "projects")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(column_type = "String(StringLen::N(256))")]
    pub description: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Project {
    fn from(model: Model) -> Self {
        Project::restore(
            model.id,
            model.description,
            Timestamps::restored(model.created_at.into(), model.updated_at.into()),
        )
    }
}

impl TryFrom<&Project> for ActiveModel {
    type Error = DbErr;

    /// Fails for a project that was never stamped; both timestamp columns are required.
    fn try_from(project: &Project) -> Result<Self, Self::Error> {
        let (created_at, updated_at) = project.timestamps().persisted().ok_or_else(|| {
            DbErr::Custom(format!("project {} has no timestamps", project.id()))
        })?;

        Ok(ActiveModel {
            id: Set(project.id()),
            description: Set(project.description().to_string()),
            created_at: Set(created_at.into()),
            updated_at: Set(updated_at.into()),
        })
    }
}
