//! JSON:API document envelope (`application/vnd.api+json`).
//!
//! Single resources travel as `{"data": {"id", "type", "attributes"}}`, collections as
//! `{"data": [...], "meta": {...}}`. Clients omit `id` when creating.

use axum::{
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationErrors};

use crate::errors::AppError;

pub const MEDIA_TYPE: &str = "application/vnd.api+json";

pub const DEFAULT_PAGE_SIZE: u64 = 25;
pub const MAX_PAGE_SIZE: u64 = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ResourceObject<A> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub attributes: A,
}

impl<A> ResourceObject<A> {
    pub fn new(kind: &str, id: impl ToString, attributes: A) -> Self {
        Self {
            id: Some(id.to_string()),
            kind: kind.to_string(),
            attributes,
        }
    }

    /// Rejects documents addressed to another resource type.
    pub fn expect_type(&self, expected: &str) -> Result<(), AppError> {
        if self.kind == expected {
            Ok(())
        } else {
            Err(AppError::BadRequest(format!(
                "Resource type '{}' does not match endpoint type '{}'.",
                self.kind, expected
            )))
        }
    }
}

impl<A: Validate> Validate for ResourceObject<A> {
    fn validate(&self) -> Result<(), ValidationErrors> {
        self.attributes.validate()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ListMeta {
    pub total: u64,
    pub page_number: u64,
    pub page_size: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Document<D> {
    pub data: D,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<ListMeta>,
}

impl<D> Document<D> {
    pub fn new(data: D) -> Self {
        Self { data, meta: None }
    }

    pub fn with_meta(data: D, meta: ListMeta) -> Self {
        Self {
            data,
            meta: Some(meta),
        }
    }
}

impl<D: Validate> Validate for Document<D> {
    fn validate(&self) -> Result<(), ValidationErrors> {
        self.data.validate()
    }
}

/// `page[size]` / `page[number]` query parameters (1-based pages).
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageParams {
    #[serde(rename = "page[size]")]
    pub size: Option<u64>,
    #[serde(rename = "page[number]")]
    pub number: Option<u64>,
}

impl PageParams {
    pub fn page_size(&self) -> u64 {
        self.size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }

    pub fn page_number(&self) -> u64 {
        self.number.unwrap_or(1).max(1)
    }

    /// Cuts one page out of `items`, keeping their order.
    pub fn paginate<T>(&self, items: Vec<T>) -> (Vec<T>, ListMeta) {
        let size = self.page_size();
        let number = self.page_number();
        let total = items.len() as u64;
        let skip = (number - 1).saturating_mul(size) as usize;

        let page = items.into_iter().skip(skip).take(size as usize).collect();

        (
            page,
            ListMeta {
                total,
                page_number: number,
                page_size: size,
            },
        )
    }
}

/// Serializes `T` with the JSON:API media type.
pub struct JsonApi<T>(pub T);

impl<T: Serialize> IntoResponse for JsonApi<T> {
    fn into_response(self) -> Response {
        match serde_json::to_vec(&self.0) {
            Ok(body) => (
                StatusCode::OK,
                [(header::CONTENT_TYPE, HeaderValue::from_static(MEDIA_TYPE))],
                body,
            )
                .into_response(),
            Err(e) => AppError::InternalServerError(format!("JSON:API serialization: {}", e))
                .into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
    struct Attributes {
        #[validate(length(max = 3))]
        description: String,
    }

    #[test]
    fn test_document_wire_shape() {
        let doc = Document::new(ResourceObject::new(
            "project",
            "42",
            Attributes {
                description: "X".to_string(),
            },
        ));

        assert_eq!(
            serde_json::to_value(&doc).unwrap(),
            json!({"data": {"id": "42", "type": "project", "attributes": {"description": "X"}}})
        );
    }

    #[test]
    fn test_create_document_without_id() {
        let doc: Document<ResourceObject<Attributes>> = serde_json::from_value(json!({
            "data": {"type": "project", "attributes": {"description": "X"}}
        }))
        .unwrap();

        assert!(doc.data.id.is_none());
        assert!(doc.data.expect_type("project").is_ok());
        assert!(doc.data.expect_type("user").is_err());
    }

    #[test]
    fn test_validation_reaches_attributes() {
        let doc = Document::new(ResourceObject::new(
            "project",
            "1",
            Attributes {
                description: "too long".to_string(),
            },
        ));
        assert!(doc.validate().is_err());
    }

    #[test]
    fn test_paginate_defaults_and_bounds() {
        let params = PageParams::default();
        let (page, meta) = params.paginate((0..30).collect::<Vec<_>>());
        assert_eq!(page.len(), 25);
        assert_eq!(meta, ListMeta { total: 30, page_number: 1, page_size: 25 });

        let params = PageParams { size: Some(10), number: Some(3) };
        let (page, _) = params.paginate((0..25).collect::<Vec<_>>());
        assert_eq!(page, vec![20, 21, 22, 23, 24]);

        let params = PageParams { size: Some(1000), number: Some(0) };
        assert_eq!(params.page_size(), MAX_PAGE_SIZE);
        assert_eq!(params.page_number(), 1);
    }

    #[test]
    fn test_json_api_response_media_type() {
        let response = JsonApi(json!({"data": []})).into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], MEDIA_TYPE);
    }
}
