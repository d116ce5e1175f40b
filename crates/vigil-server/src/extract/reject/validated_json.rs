//! JSON extractor that also runs `validator` checks.

use std::borrow::Cow;
use std::collections::HashMap;

use axum::extract::{FromRequest, Request};
use derive_more::{Deref, DerefMut, From};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use super::Json;
use crate::handler::{Error, ErrorKind};

/// JSON extractor with automatic request validation.
///
/// Deserializes the body like [`Json`] and then runs the payload's
/// [`Validate`] implementation, turning validation failures into
/// field-level error messages.
#[must_use]
#[derive(Debug, Clone, Copy, Default, Deref, DerefMut, From)]
pub struct ValidateJson<T>(pub T);

impl<T> ValidateJson<T> {
    /// Creates a new instance of [`ValidateJson`].
    #[inline]
    pub fn new(inner: T) -> Self {
        Self(inner)
    }

    /// Returns the inner validated value.
    #[inline]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T, S> FromRequest<S> for ValidateJson<T>
where
    T: DeserializeOwned + Validate + 'static,
    S: Send + Sync,
{
    type Rejection = Error<'static>;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = <Json<T> as FromRequest<S>>::from_request(req, state).await?;

        data.validate()?;
        Ok(Self::new(data))
    }
}

/// Formats a length constraint violation with its bounds.
fn format_length_error(
    field: &str,
    params: &HashMap<Cow<'static, str>, serde_json::Value>,
) -> String {
    let bound = |key: &str| params.get(key).and_then(serde_json::Value::as_f64);

    match (bound("min"), bound("max")) {
        (Some(min), Some(max)) => format!(
            "Field '{}' must be between {} and {} characters long",
            field, min as u64, max as u64
        ),
        (Some(min), None) => format!(
            "Field '{}' must be at least {} characters long",
            field, min as u64
        ),
        (None, Some(max)) => format!(
            "Field '{}' must be at most {} characters long",
            field, max as u64
        ),
        _ => format!("Field '{}' has invalid length", field),
    }
}

/// Formats a numeric range violation with its bounds.
fn format_range_error(
    field: &str,
    params: &HashMap<Cow<'static, str>, serde_json::Value>,
) -> String {
    let bound = |key: &str| params.get(key).and_then(serde_json::Value::as_f64);

    match (bound("min"), bound("max")) {
        (Some(min), Some(max)) => {
            format!("Field '{}' must be between {} and {}", field, min, max)
        }
        (Some(min), None) => format!("Field '{}' must be at least {}", field, min),
        (None, Some(max)) => format!("Field '{}' must be at most {}", field, max),
        _ => format!("Field '{}' is out of valid range", field),
    }
}

/// Produces a user-facing message for a single validation error.
fn format_validation_error(field: &str, error: &validator::ValidationError) -> String {
    if let Some(custom_message) = &error.message {
        return format!("Field '{}': {}", field, custom_message);
    }

    let message = match error.code.as_ref() {
        "required" => "is required and cannot be empty".to_string(),
        "length" => return format_length_error(field, &error.params),
        "range" => return format_range_error(field, &error.params),
        "email" => "must be a valid email address".to_string(),
        "url" => "must be a valid URL".to_string(),
        "regex" => "format is invalid".to_string(),
        code => format!("failed validation: {}", code),
    };

    format!("Field '{}' {}", field, message)
}

impl From<ValidationErrors> for Error<'static> {
    fn from(errors: ValidationErrors) -> Self {
        let error_messages: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, field_errors)| {
                field_errors
                    .iter()
                    .map(move |error| format_validation_error(field, error))
            })
            .collect();

        let user_message = match error_messages.as_slice() {
            [] => "Validation failed".to_string(),
            [single_error] => single_error.clone(),
            multiple => multiple.join(". "),
        };

        tracing::warn!(
            errors = ?errors.field_errors(),
            "request validation failed"
        );

        ErrorKind::BadRequest
            .with_message(user_message)
            .with_resource("request")
    }
}

#[cfg(test)]
mod tests {
    use validator::Validate;

    use super::*;

    #[derive(Debug, Validate)]
    struct LoginPayload {
        #[validate(length(min = 1, max = 64))]
        username: String,
        #[validate(length(min = 8))]
        password: String,
    }

    #[test]
    fn validation_errors_map_to_bad_request() {
        let payload = LoginPayload {
            username: String::new(),
            password: "short".to_string(),
        };

        let errors = payload.validate().expect_err("payload must be invalid");
        let error = Error::from(errors);

        assert_eq!(error.kind(), ErrorKind::BadRequest);
        let message = error.message().unwrap_or_default().to_string();
        assert!(message.contains("username") || message.contains("password"));
    }

    #[test]
    fn length_error_includes_bounds() {
        let payload = LoginPayload {
            username: "operator".to_string(),
            password: "short".to_string(),
        };

        let errors = payload.validate().expect_err("payload must be invalid");
        let error = Error::from(errors);
        let message = error.message().unwrap_or_default().to_string();

        assert!(message.contains("at least 8"));
    }
}
