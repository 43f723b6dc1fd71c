use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use database::DatabaseError;
use thiserror::Error;

use crate::builder::BuilderValidationError;

/// Message returned when the id in the path and the id in the body disagree.
pub const ID_MISMATCH: &str = "Id mismatch. Provided id does not match provided resource id.";

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Entity Type {entity} with Id {id} already exists.")]
    EntityAlreadyExists { entity: &'static str, id: String },

    #[error("Entity Type {entity} with Id {id} does not exist.")]
    EntityDoesNotExist { entity: &'static str, id: String },

    #[error("{message}")]
    InvalidArgument { argument: &'static str, message: String },

    #[error(transparent)]
    Validation(#[from] BuilderValidationError),

    #[error("Store error: {0}")]
    Store(#[from] DatabaseError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    pub fn already_exists(entity: &'static str, id: impl ToString) -> Self {
        Self::EntityAlreadyExists {
            entity,
            id: id.to_string(),
        }
    }

    pub fn does_not_exist(entity: &'static str, id: impl ToString) -> Self {
        Self::EntityDoesNotExist {
            entity,
            id: id.to_string(),
        }
    }

    pub fn invalid_argument(argument: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            argument,
            message: message.into(),
        }
    }

    pub fn id_mismatch() -> Self {
        Self::invalid_argument("id", ID_MISMATCH)
    }

    /// Store failures are the only errors that are not the caller's fault.
    pub fn is_store(&self) -> bool {
        matches!(self, Self::Store(_))
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::EntityAlreadyExists { .. } => AppError::Conflict(err.to_string()),
            ServiceError::EntityDoesNotExist { .. } => AppError::NotFound(err.to_string()),
            ServiceError::InvalidArgument { message, .. } => AppError::BadRequest(message),
            ServiceError::Validation(e) => AppError::UnprocessableEntity {
                message: format!("{} is invalid", e.entity),
                details: serde_json::to_value(&e.errors).ok(),
            },
            ServiceError::Store(e) => AppError::InternalServerError(e.to_string()),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::FieldError;
    use axum::http::StatusCode;
    use http_body_util::BodyExt;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            ServiceError::already_exists("Project", "abc").to_string(),
            "Entity Type Project with Id abc already exists."
        );
        assert_eq!(
            ServiceError::does_not_exist("User", 7).to_string(),
            "Entity Type User with Id 7 does not exist."
        );
        assert_eq!(ServiceError::id_mismatch().to_string(), ID_MISMATCH);
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let cases = [
            (ServiceError::already_exists("Project", 1), StatusCode::CONFLICT),
            (ServiceError::does_not_exist("Project", 1), StatusCode::NOT_FOUND),
            (ServiceError::id_mismatch(), StatusCode::BAD_REQUEST),
            (
                ServiceError::Store(DatabaseError::Generic("boom".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[tokio::test]
    async fn test_validation_error_lists_fields() {
        let err = ServiceError::Validation(BuilderValidationError {
            entity: "Project",
            errors: vec![FieldError {
                field: "description".into(),
                message: "Description must not be empty".into(),
            }],
        });

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = body_json(response).await;
        assert_eq!(body["details"][0]["field"], "description");
    }

    #[tokio::test]
    async fn test_store_error_is_not_leaked() {
        let response =
            ServiceError::Store(DatabaseError::Generic("password=hunter2".into())).into_response();
        let body = body_json(response).await;
        assert!(!body["message"].as_str().unwrap().contains("hunter2"));
    }
}
