use axum::{Router, routing::get};
use database::UnitOfWorkFactory;
use database::postgres::DatabaseConnection;
use domain_core::RepositoryProvider;
use domain_projects::{PROJECT_TYPE, Project};
use domain_users::{USER_TYPE, User};

pub mod health;

/// JSON:API routes without the `/api` prefix, which `create_router` adds.
/// Each resource is nested under its resource type: `/project`, `/user`.
pub fn routes<P, U>(projects: P, users: U) -> Router
where
    P: UnitOfWorkFactory,
    P::UnitOfWork: RepositoryProvider<Project>,
    U: UnitOfWorkFactory,
    U::UnitOfWork: RepositoryProvider<User>,
{
    Router::new()
        .nest(&format!("/{PROJECT_TYPE}"), domain_projects::handlers::router(projects))
        .nest(&format!("/{USER_TYPE}"), domain_users::handlers::router(users))
}

/// `/ready`, probing the database.
pub fn ready_router(db: DatabaseConnection) -> Router {
    Router::new()
        .route("/ready", get(health::ready_handler))
        .with_state(db)
}
