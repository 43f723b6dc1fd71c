//! Users domain.
//!
//! A [`User`] owns its claims, roles and external logins; the Postgres
//! repository stores them in child tables and replaces them on every write.
//! Passwords arrive in plaintext on the wire and are hashed with argon2 by
//! [`UserMapper`] before a user is built.
//!
//! ```rust,no_run
//! use database::SeaOrmUnitOfWorkFactory;
//! use domain_users::handlers;
//!
//! # async fn example(db: sea_orm::DatabaseConnection) {
//! let router = handlers::router(SeaOrmUnitOfWorkFactory::new(db));
//! # }
//! ```

pub mod entity;
pub mod handlers;
pub mod models;
pub mod password;
pub mod postgres;
pub mod resource;
pub mod service;

pub use models::{User, UserBuilder, UserClaim, UserData, UserLogin, UserRole};
pub use postgres::PgUserRepository;
pub use resource::{USER_TYPE, UserAttributes, UserMapper, UserResource};
pub use service::{UserCommands, UserResourceService, UserService};
