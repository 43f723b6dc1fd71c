//! SeaORM entities for the user aggregate: one row in `users` plus its
//! claims, roles and logins in child tables.

use domain_core::{DomainEntity, Timestamps};
use sea_orm::ActiveValue::Set;
use sea_orm::DbErr;
use sea_orm::prelude::DateTimeWithTimeZone;
use uuid::Uuid;

use crate::models::{User, UserClaim, UserData, UserLogin, UserRole};

pub mod users {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "users")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        #[sea_orm(unique)]
        pub user_name: String,
        #[sea_orm(unique)]
        pub email: String,
        pub password: String,
        pub name: String,
        pub is_active: bool,
        pub is_deleted: bool,
        pub is_email_confirmed: bool,
        pub is_two_factor_authentication_enabled: bool,
        pub security_stamp: String,
        pub created_at: DateTimeWithTimeZone,
        pub updated_at: DateTimeWithTimeZone,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod user_claims {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "user_claims")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub user_id: Uuid,
        pub claim_type: String,
        pub claim_value: String,
        pub created_at: DateTimeWithTimeZone,
        pub updated_at: DateTimeWithTimeZone,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod user_roles {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "user_roles")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub user_id: Uuid,
        #[sea_orm(primary_key, auto_increment = false)]
        pub role: String,
        pub created_at: DateTimeWithTimeZone,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod user_logins {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "user_logins")]
    pub struct Model {
        pub user_id: Uuid,
        #[sea_orm(primary_key, auto_increment = false)]
        pub login_provider: String,
        #[sea_orm(primary_key, auto_increment = false)]
        pub provider_key: String,
        pub created_at: DateTimeWithTimeZone,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

/// Child rows of one user, as loaded from the child tables.
#[derive(Debug, Default)]
pub struct UserChildren {
    pub claims: Vec<user_claims::Model>,
    pub roles: Vec<user_roles::Model>,
    pub logins: Vec<user_logins::Model>,
}

impl User {
    pub(crate) fn from_rows(model: users::Model, children: UserChildren) -> Self {
        let data = UserData {
            user_name: model.user_name,
            email: model.email,
            password: model.password,
            name: model.name,
            is_active: model.is_active,
            is_deleted: model.is_deleted,
            is_email_confirmed: model.is_email_confirmed,
            is_two_factor_authentication_enabled: model.is_two_factor_authentication_enabled,
            security_stamp: model.security_stamp,
            claims: children
                .claims
                .into_iter()
                .map(|c| UserClaim::new(c.claim_type, c.claim_value))
                .collect(),
            roles: children.roles.into_iter().map(|r| UserRole::new(r.role)).collect(),
            logins: children
                .logins
                .into_iter()
                .map(|l| UserLogin::new(l.login_provider, l.provider_key))
                .collect(),
        };

        User::restore(
            model.id,
            data,
            Timestamps::restored(model.created_at.into(), model.updated_at.into()),
        )
    }
}

/// Rows that persist a stamped user: the user row and its child rows.
pub struct UserRows {
    pub user: users::ActiveModel,
    pub children: ChildRows,
}

pub struct ChildRows {
    pub claims: Vec<user_claims::ActiveModel>,
    pub roles: Vec<user_roles::ActiveModel>,
    pub logins: Vec<user_logins::ActiveModel>,
}

impl TryFrom<&User> for UserRows {
    type Error = DbErr;

    /// Fails for a user that was never stamped.
    fn try_from(user: &User) -> Result<Self, Self::Error> {
        let (created_at, updated_at) = user
            .timestamps()
            .persisted()
            .ok_or_else(|| DbErr::Custom(format!("user {} has no timestamps", user.id())))?;
        let created_at: DateTimeWithTimeZone = created_at.into();
        let updated_at: DateTimeWithTimeZone = updated_at.into();
        let user_id = user.id();

        Ok(UserRows {
            user: users::ActiveModel {
                id: Set(user_id),
                user_name: Set(user.user_name().to_string()),
                email: Set(user.email().to_string()),
                password: Set(user.password_hash().to_string()),
                name: Set(user.name().to_string()),
                is_active: Set(user.is_active()),
                is_deleted: Set(user.is_deleted()),
                is_email_confirmed: Set(user.is_email_confirmed()),
                is_two_factor_authentication_enabled: Set(user.is_two_factor_authentication_enabled()),
                security_stamp: Set(user.security_stamp().to_string()),
                created_at: Set(created_at),
                updated_at: Set(updated_at),
            },
            children: ChildRows {
                claims: user
                    .claims()
                    .iter()
                    .map(|claim| user_claims::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        user_id: Set(user_id),
                        claim_type: Set(claim.claim_type.clone()),
                        claim_value: Set(claim.value.clone()),
                        created_at: Set(updated_at),
                        updated_at: Set(updated_at),
                    })
                    .collect(),
                roles: user
                    .roles()
                    .iter()
                    .map(|role| user_roles::ActiveModel {
                        user_id: Set(user_id),
                        role: Set(role.name.clone()),
                        created_at: Set(updated_at),
                    })
                    .collect(),
                logins: user
                    .logins()
                    .iter()
                    .map(|login| user_logins::ActiveModel {
                        user_id: Set(user_id),
                        login_provider: Set(login.login_provider.clone()),
                        provider_key: Set(login.provider_key.clone()),
                        created_at: Set(updated_at),
                    })
                    .collect(),
            },
        })
    }
}
