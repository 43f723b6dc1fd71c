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

use crate::models::Project;
use crate::resource::{PROJECT_TYPE, ProjectAttributes, ProjectMapper, ProjectResource};
use crate::service::ProjectResourceService;

pub const TAG: &str = "project";

pub type ProjectObject = ResourceObject<ProjectAttributes>;

#[derive(OpenApi)]
#[openapi(
    paths(list_projects, create_project, get_project, update_project, delete_project),
    components(
        schemas(ProjectAttributes, ListMeta),
        responses(
            BadRequestResponse,
            NotFoundResponse,
            ConflictResponse,
            UnprocessableEntityResponse,
            InternalServerErrorResponse
        )
    ),
    tags((name = TAG, description = "Project resources"))
)]
pub struct ApiDoc;

/// JSON:API project routes, relative to where the router is nested.
///
/// Every request gets its own unit of work from `factory`.
pub fn router<F>(factory: F) -> Router
where
    F: UnitOfWorkFactory,
    F::UnitOfWork: RepositoryProvider<Project>,
{
    Router::new()
        .route("/", get(list_projects::<F>).post(create_project::<F>))
        .route(
            "/{id}",
            get(get_project::<F>)
                .patch(update_project::<F>)
                .delete(delete_project::<F>),
        )
        .with_state(factory)
}

fn resource_service<F>(factory: &F) -> ProjectResourceService<F::UnitOfWork>
where
    F: UnitOfWorkFactory,
    F::UnitOfWork: RepositoryProvider<Project>,
{
    ProjectResourceService::new(factory.create(), ProjectMapper)
}

/// List projects
#[utoipa::path(
    get,
    path = "",
    tag = TAG,
    params(PageParams),
    responses(
        (status = 200, description = "One page of projects", body = Document<Vec<ResourceObject<ProjectAttributes>>>, content_type = "application/vnd.api+json"),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_projects<F>(
    State(factory): State<F>,
    Query(page): Query<PageParams>,
) -> Result<JsonApi<Document<Vec<ProjectObject>>>, AppError>
where
    F: UnitOfWorkFactory,
    F::UnitOfWork: RepositoryProvider<Project>,
{
    let projects = resource_service(&factory).get_all().await?;
    let (page, meta) = page.paginate(projects);

    Ok(JsonApi(Document::with_meta(
        page.into_iter().map(Into::into).collect(),
        meta,
    )))
}

/// Create a project
///
/// The id is generated unless the document carries one.
#[utoipa::path(
    post,
    path = "",
    tag = TAG,
    request_body(content = Document<ResourceObject<ProjectAttributes>>, content_type = "application/vnd.api+json"),
    responses(
        (status = 201, description = "Project created", body = Document<ResourceObject<ProjectAttributes>>, content_type = "application/vnd.api+json"),
        (status = 400, response = BadRequestResponse),
        (status = 409, response = ConflictResponse),
        (status = 422, response = UnprocessableEntityResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_project<F>(
    State(factory): State<F>,
    ValidatedJson(document): ValidatedJson<Document<ProjectObject>>,
) -> Result<(StatusCode, JsonApi<Document<ProjectObject>>), AppError>
where
    F: UnitOfWorkFactory,
    F::UnitOfWork: RepositoryProvider<Project>,
{
    document.data.expect_type(PROJECT_TYPE)?;
    let resource = ProjectResource::try_from(document.data)?;

    let created = resource_service(&factory).create(resource).await?;

    Ok((StatusCode::CREATED, JsonApi(Document::new(created.into()))))
}

/// Get a project
#[utoipa::path(
    get,
    path = "/{id}",
    tag = TAG,
    params(("id" = Uuid, Path, description = "Project id")),
    responses(
        (status = 200, description = "Project found", body = Document<ResourceObject<ProjectAttributes>>, content_type = "application/vnd.api+json"),
        (status = 400, response = BadRequestResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_project<F>(
    State(factory): State<F>,
    UuidPath(id): UuidPath,
) -> Result<JsonApi<Document<ProjectObject>>, AppError>
where
    F: UnitOfWorkFactory,
    F::UnitOfWork: RepositoryProvider<Project>,
{
    let project = resource_service(&factory).get(id).await?;
    Ok(JsonApi(Document::new(project.into())))
}

/// Replace a project's attributes
///
/// `data.id` must equal the path id.
#[utoipa::path(
    patch,
    path = "/{id}",
    tag = TAG,
    params(("id" = Uuid, Path, description = "Project id")),
    request_body(content = Document<ResourceObject<ProjectAttributes>>, content_type = "application/vnd.api+json"),
    responses(
        (status = 200, description = "Project updated", body = Document<ResourceObject<ProjectAttributes>>, content_type = "application/vnd.api+json"),
        (status = 400, response = BadRequestResponse),
        (status = 404, response = NotFoundResponse),
        (status = 422, response = UnprocessableEntityResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_project<F>(
    State(factory): State<F>,
    UuidPath(id): UuidPath,
    ValidatedJson(document): ValidatedJson<Document<ProjectObject>>,
) -> Result<JsonApi<Document<ProjectObject>>, AppError>
where
    F: UnitOfWorkFactory,
    F::UnitOfWork: RepositoryProvider<Project>,
{
    document.data.expect_type(PROJECT_TYPE)?;
    let resource = ProjectResource::try_from(document.data)?;

    let updated = resource_service(&factory).update(id, resource).await?;

    Ok(JsonApi(Document::new(updated.into())))
}

/// Delete a project
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = TAG,
    params(("id" = Uuid, Path, description = "Project id")),
    responses(
        (status = 204, description = "Project deleted"),
        (status = 400, response = BadRequestResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_project<F>(
    State(factory): State<F>,
    UuidPath(id): UuidPath,
) -> Result<StatusCode, AppError>
where
    F: UnitOfWorkFactory,
    F::UnitOfWork: RepositoryProvider<Project>,
{
    if resource_service(&factory).delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ServiceError::does_not_exist(Project::TYPE_NAME, id).into())
    }
}
