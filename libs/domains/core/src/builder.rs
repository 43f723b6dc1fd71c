//! Validated entity construction.
//!
//! A builder gathers fields, [`Builder::do_build`] assembles a candidate and
//! [`Builder::build`] runs the entity's `validator` rules over it. Every failing
//! rule is reported, not just the first.

use serde::Serialize;
use std::borrow::Cow;
use thiserror::Error;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors, ValidationErrorsKind};

use crate::entity::DomainEntity;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{entity} failed validation with {} error(s)", .errors.len())]
pub struct BuilderValidationError {
    pub entity: &'static str,
    pub errors: Vec<FieldError>,
}

impl BuilderValidationError {
    /// Flattens `validator` errors, including nested structs and lists, into
    /// one error per violated rule ordered by field name.
    pub fn from_validation(entity: &'static str, errors: &ValidationErrors) -> Self {
        let mut collected = Vec::new();
        flatten(errors, &mut collected);
        collected.sort_by(|a, b| a.field.cmp(&b.field).then_with(|| a.message.cmp(&b.message)));

        Self {
            entity,
            errors: collected,
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.errors.iter().map(|e| e.field.as_str())
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.fields().any(|f| f == field)
    }
}

fn flatten(errors: &ValidationErrors, out: &mut Vec<FieldError>) {
    for (field, kind) in errors.errors() {
        match kind {
            ValidationErrorsKind::Field(violations) => {
                out.extend(violations.iter().map(|violation| FieldError {
                    field: field.to_string(),
                    message: violation
                        .message
                        .as_ref()
                        .map(Cow::to_string)
                        .unwrap_or_else(|| violation.code.to_string()),
                }));
            }
            ValidationErrorsKind::Struct(nested) => flatten(nested, out),
            ValidationErrorsKind::List(items) => {
                for nested in items.values() {
                    flatten(nested, out);
                }
            }
        }
    }
}

pub trait Builder: Sized {
    type Output: DomainEntity + Validate;

    /// Assembles the entity from the collected fields without checking it.
    fn do_build(self) -> Self::Output;

    fn build(self) -> Result<Self::Output, BuilderValidationError> {
        let candidate = self.do_build();
        candidate.validate().map_err(|errors| {
            BuilderValidationError::from_validation(
                <Self::Output as DomainEntity>::TYPE_NAME,
                &errors,
            )
        })?;
        Ok(candidate)
    }
}

/// `validator` rule rejecting the nil UUID.
pub fn validate_not_nil(id: &Uuid) -> Result<(), ValidationError> {
    if id.is_nil() {
        return Err(ValidationError::new("not_nil").with_message(Cow::Borrowed("Id must not be empty")));
    }
    Ok(())
}
