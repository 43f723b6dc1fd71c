use axum::{
    Router,
    extract::{Query, State},
    http::StatusCode,
    routing::get,
};
use axum_helpers::{
    AppError, Document, JsonApi, ListMeta, PageParams, ResourceObject, UuidPath, ValidatedJson,
    errors::responses::{
        BadRequestResponse, ConflictResponse, InternalServerErrorResponse, NotFoundResponse,
        UnprocessableEntityResponse,
    },
};
use database::UnitOfWorkFactory;
use domain_core::{DomainEntity, RepositoryProvider, ServiceError};
use utoipa::OpenApi;

use crate::models::User;
use crate::resource::{USER_TYPE, UserAttributes, UserMapper, UserResource};
use crate::service::UserResourceService;

pub const TAG: &str = "user";

pub type UserObject = ResourceObject<UserAttributes>;

#[derive(OpenApi)]
#[openapi(
    paths(list_users, create_user, get_user, update_user, delete_user),
    components(
        schemas(UserAttributes, ListMeta),
        responses(
            BadRequestResponse,
            NotFoundResponse,
            ConflictResponse,
            UnprocessableEntityResponse,
            InternalServerErrorResponse
        )
    ),
    tags((name = TAG, description = "User resources"))
)]
pub struct ApiDoc;

/// JSON:API user routes, relative to where the router is nested.
///
/// Every request gets its own unit of work from `factory`.
pub fn router<F>(factory: F) -> Router
where
    F: UnitOfWorkFactory,
    F::UnitOfWork: RepositoryProvider<User>,
{
    Router::new()
        .route("/", get(list_users::<F>).post(create_user::<F>))
        .route(
            "/{id}",
            get(get_user::<F>)
                .patch(update_user::<F>)
                .delete(delete_user::<F>),
        )
        .with_state(factory)
}

fn resource_service<F>(factory: &F) -> UserResourceService<F::UnitOfWork>
where
    F: UnitOfWorkFactory,
    F::UnitOfWork: RepositoryProvider<User>,
{
    UserResourceService::new(factory.create(), UserMapper)
}

/// List users
#[utoipa::path(
    get,
    path = "",
    tag = TAG,
    params(PageParams),
    responses(
        (status = 200, description = "One page of users", body = Document<Vec<ResourceObject<UserAttributes>>>, content_type = "application/vnd.api+json"),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_users<F>(
    State(factory): State<F>,
    Query(page): Query<PageParams>,
) -> Result<JsonApi<Document<Vec<UserObject>>>, AppError>
where
    F: UnitOfWorkFactory,
    F::UnitOfWork: RepositoryProvider<User>,
{
    let users = resource_service(&factory).get_all().await?;
    let (page, meta) = page.paginate(users);

    Ok(JsonApi(Document::with_meta(
        page.into_iter().map(Into::into).collect(),
        meta,
    )))
}

/// Create a user
///
/// `password` is required and stored as an argon2 hash. The id is generated
/// unless the document carries one.
#[utoipa::path(
    post,
    path = "",
    tag = TAG,
    request_body(content = Document<ResourceObject<UserAttributes>>, content_type = "application/vnd.api+json"),
    responses(
        (status = 201, description = "User created", body = Document<ResourceObject<UserAttributes>>, content_type = "application/vnd.api+json"),
        (status = 400, response = BadRequestResponse),
        (status = 409, response = ConflictResponse),
        (status = 422, response = UnprocessableEntityResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_user<F>(
    State(factory): State<F>,
    ValidatedJson(document): ValidatedJson<Document<UserObject>>,
) -> Result<(StatusCode, JsonApi<Document<UserObject>>), AppError>
where
    F: UnitOfWorkFactory,
    F::UnitOfWork: RepositoryProvider<User>,
{
    document.data.expect_type(USER_TYPE)?;
    let resource = UserResource::try_from(document.data)?;

    let created = resource_service(&factory).create(resource).await?;

    Ok((StatusCode::CREATED, JsonApi(Document::new(created.into()))))
}

/// Get a user
#[utoipa::path(
    get,
    path = "/{id}",
    tag = TAG,
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "User found", body = Document<ResourceObject<UserAttributes>>, content_type = "application/vnd.api+json"),
        (status = 400, response = BadRequestResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_user<F>(
    State(factory): State<F>,
    UuidPath(id): UuidPath,
) -> Result<JsonApi<Document<UserObject>>, AppError>
where
    F: UnitOfWorkFactory,
    F::UnitOfWork: RepositoryProvider<User>,
{
    let user = resource_service(&factory).get(id).await?;
    Ok(JsonApi(Document::new(user.into())))
}

/// Replace a user's attributes
///
/// `data.id` must equal the path id. Omitting `password` keeps the current one.
#[utoipa::path(
    patch,
    path = "/{id}",
    tag = TAG,
    params(("id" = Uuid, Path, description = "User id")),
    request_body(content = Document<ResourceObject<UserAttributes>>, content_type = "application/vnd.api+json"),
    responses(
        (status = 200, description = "User updated", body = Document<ResourceObject<UserAttributes>>, content_type = "application/vnd.api+json"),
        (status = 400, response = BadRequestResponse),
        (status = 404, response = NotFoundResponse),
        (status = 422, response = UnprocessableEntityResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_user<F>(
    State(factory): State<F>,
    UuidPath(id): UuidPath,
    ValidatedJson(document): ValidatedJson<Document<UserObject>>,
) -> Result<JsonApi<Document<UserObject>>, AppError>
where
    F: UnitOfWorkFactory,
    F::UnitOfWork: RepositoryProvider<User>,
{
    document.data.expect_type(USER_TYPE)?;
    let resource = UserResource::try_from(document.data)?;

    let updated = resource_service(&factory).update(id, resource).await?;

    Ok(JsonApi(Document::new(updated.into())))
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = TAG,
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 400, response = BadRequestResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_user<F>(
    State(factory): State<F>,
    UuidPath(id): UuidPath,
) -> Result<StatusCode, AppError>
where
    F: UnitOfWorkFactory,
    F::UnitOfWork: RepositoryProvider<User>,
{
    if resource_service(&factory).delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ServiceError::does_not_exist(User::TYPE_NAME, id).into())
    }
}
