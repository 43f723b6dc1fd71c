//! Projects domain.
//!
//! ```text
//! ┌────────────────────────┐
//! │ Handlers               │  ← JSON:API endpoints under /project
//! └───────────┬────────────┘
//!             │
//! ┌───────────▼────────────┐
//! │ ProjectResourceService │  ← id checks, wire ↔ entity mapping
//! └───────────┬────────────┘
//!             │
//! ┌───────────▼────────────┐
//! │ ProjectService         │  ← existence rules, transactions
//! └───────────┬────────────┘
//!             │
//! ┌───────────▼────────────┐
//! │ PgProjectRepository    │  ← SeaORM, bound to a unit of work
//! └────────────────────────┘
//! ```
//!
//! ```rust,no_run
//! use database::SeaOrmUnitOfWorkFactory;
//! use domain_projects::handlers;
//!
//! # async fn example(db: sea_orm::DatabaseConnection) {
//! let router = handlers::router(SeaOrmUnitOfWorkFactory::new(db));
//! # }
//! ```

pub mod entity;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod resource;
pub mod service;

pub use models::{Project, ProjectBuilder, ProjectData};
pub use postgres::PgProjectRepository;
pub use resource::{PROJECT_TYPE, ProjectAttributes, ProjectMapper, ProjectResource};
pub use service::{ProjectResourceService, ProjectService};
