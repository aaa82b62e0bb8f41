//! Validated JSON extractor - Combines deserialization with validation.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use common::AppError;

/// JSON body that has passed its `validator` rules.
///
/// Malformed bodies reject with `AppError::BadRequest`, rule violations
/// with `AppError::Validation`.
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;

        value
            .validate()
            .map_err(|e| AppError::validation(format_validation_errors(&e)))?;

        Ok(ValidatedJson(value))
    }
}

/// Flatten validation errors into one message, nested structs included
fn format_validation_errors(errors: &ValidationErrors) -> String {
    let mut messages = Vec::new();
    collect_messages(errors, &mut messages);
    messages.sort();
    messages.join(", ")
}

fn collect_messages(errors: &ValidationErrors, out: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        match kind {
            ValidationErrorsKind::Field(errs) => {
                out.extend(errs.iter().map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{} is invalid", field))
                }));
            }
            ValidationErrorsKind::Struct(inner) => collect_messages(inner, out),
            ValidationErrorsKind::List(items) => {
                for inner in items.values() {
                    collect_messages(inner, out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{CreateUserRequest, SearchUsersRequest};

    #[test]
    fn test_format_field_errors() {
        let request = CreateUserRequest {
            username: String::new(),
            full_name: String::new(),
            authorities: vec!["root".to_string()],
            password: "p".to_string(),
            re_password: "p".to_string(),
        };
        let errors = request.validate().unwrap_err();
        let message = format_validation_errors(&errors);

        assert!(message.contains("Username cannot be empty"));
        assert!(message.contains("Invalid role"));
    }

    #[test]
    fn test_format_nested_errors() {
        let mut request = SearchUsersRequest::default();
        request.pagination.per_page = 0;
        let errors = request.validate().unwrap_err();

        assert_eq!(
            format_validation_errors(&errors),
            "Page size must be at least 1"
        );
    }
}
