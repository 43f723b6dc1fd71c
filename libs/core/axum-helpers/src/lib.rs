//! # Axum Helpers
//!
//! Shared HTTP plumbing for the API binary and the domain routers.
//!
//! - **[`errors`]**: [`AppError`] and the [`ErrorResponse`] body with [`ErrorCode`]s
//! - **[`extractors`]**: [`UuidPath`], [`ValidatedJson`]
//! - **[`jsonapi`]**: JSON:API documents, pagination and the `application/vnd.api+json` responder
//! - **[`server`]**: router assembly with OpenAPI viewers, health endpoints, graceful shutdown
//! - **[`http`]**: security headers middleware

pub mod errors;
pub mod extractors;
pub mod http;
pub mod jsonapi;
pub mod server;

pub use server::{
    HealthCheckFuture, HealthResponse, ShutdownCoordinator, create_app, create_production_app,
    create_router, health_router, run_health_checks, shutdown_signal,
};

pub use http::security_headers;

pub use errors::{AppError, ErrorCode, ErrorResponse};

pub use extractors::{UuidPath, ValidatedJson};

pub use jsonapi::{Document, JsonApi, ListMeta, PageParams, ResourceObject};
