use axum_helpers::ResourceObject;
use domain_core::{Builder, DomainEntity, ResourceMapper, ServiceError, ServiceResult, parse_resource_id};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidateEmail, ValidationError};

use crate::models::{User, UserBuilder};
use crate::password::hash_password;

/// JSON:API resource type of users.
pub const USER_TYPE: &str = "user";

/// A missing email is reported by the builder; only a malformed one is rejected here.
fn validate_email_format(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() || email.validate_email() {
        Ok(())
    } else {
        Err(ValidationError::new("email").with_message("Email must be a valid address".into()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema, Validate)]
pub struct UserAttributes {
    /// Defaults to the email.
    #[serde(default)]
    #[validate(length(max = 256, message = "User name must be at most 256 characters"))]
    #[schema(example = "ada")]
    pub user_name: String,

    #[serde(default)]
    #[validate(custom(function = "validate_email_format"))]
    #[schema(example = "ada@example.com")]
    pub email: String,

    #[serde(default)]
    #[schema(example = "Ada Lovelace")]
    pub name: String,

    /// New users are active unless this says otherwise. Left unchanged when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,

    /// Ignored on create; new users start unconfirmed. Left unchanged when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_email_confirmed: Option<bool>,

    /// Plaintext; hashed before it is stored and never returned.
    #[serde(default, skip_serializing)]
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    #[schema(write_only)]
    pub password: Option<String>,
}

/// Wire view of a user. `password` is only ever set on requests, and the
/// flags are `None` when a request leaves them out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserResource {
    pub id: Option<Uuid>,
    pub user_name: String,
    pub email: String,
    pub name: String,
    pub is_active: Option<bool>,
    pub is_email_confirmed: Option<bool>,
    pub password: Option<String>,
}

impl From<UserResource> for ResourceObject<UserAttributes> {
    fn from(resource: UserResource) -> Self {
        ResourceObject {
            id: resource.id.map(|id| id.to_string()),
            kind: USER_TYPE.to_string(),
            attributes: UserAttributes {
                user_name: resource.user_name,
                email: resource.email,
                name: resource.name,
                is_active: resource.is_active,
                is_email_confirmed: resource.is_email_confirmed,
                password: None,
            },
        }
    }
}

impl TryFrom<ResourceObject<UserAttributes>> for UserResource {
    type Error = ServiceError;

    fn try_from(object: ResourceObject<UserAttributes>) -> Result<Self, Self::Error> {
        let id = parse_resource_id(object.id.as_deref())?;
        let attributes = object.attributes;

        Ok(Self {
            id,
            user_name: attributes.user_name,
            email: attributes.email,
            name: attributes.name,
            is_active: attributes.is_active,
            is_email_confirmed: attributes.is_email_confirmed,
            password: attributes.password,
        })
    }
}

/// Maps users to [`UserResource`]s. On update the stored collections are
/// kept, and so are the flags and the hash the request leaves out.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserMapper;

impl ResourceMapper<User> for UserMapper {
    type Resource = UserResource;

    fn to_resource(&self, user: &User) -> UserResource {
        UserResource {
            id: Some(user.id()),
            user_name: user.user_name().to_string(),
            email: user.email().to_string(),
            name: user.name().to_string(),
            is_active: Some(user.is_active()),
            is_email_confirmed: Some(user.is_email_confirmed()),
            password: None,
        }
    }

    fn resource_id(&self, resource: &UserResource) -> Option<Uuid> {
        resource.id
    }

    fn to_entity(&self, id: Uuid, resource: UserResource, existing: Option<&User>) -> ServiceResult<User> {
        let mut builder = match existing {
            Some(user) => {
                let builder = UserBuilder::from_user(user);
                match resource.is_email_confirmed {
                    Some(confirmed) => builder.with_email_confirmed(confirmed),
                    None => builder,
                }
            }
            None => UserBuilder::default(),
        };
        if let Some(active) = resource.is_active {
            builder = builder.with_active(active);
        }
        if let Some(password) = resource.password.as_deref() {
            builder = builder.with_password_hash(hash_password(password)?);
        }

        Ok(builder
            .with_id(id)
            .with_user_name(resource.user_name)
            .with_email(resource.email)
            .with_name(resource.name)
            .build()?)
    }
}
