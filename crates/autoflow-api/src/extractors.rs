//! # Custom Extractors & Validation
//!
//! Provides the [`Validate`] trait for request DTOs and helpers to
//! extract + validate JSON bodies in handlers.

use axum::extract::rejection::JsonRejection;
use axum::Json;

use crate::error::AppError;

/// Trait for request types that can validate their business rules
/// beyond what serde deserialization checks.
pub trait Validate {
    /// Validate business rules. Returns an error message on failure.
    fn validate(&self) -> Result<(), String>;
}

/// Extract a JSON body, mapping deserialization errors to [`AppError::BadRequest`].
///
/// ```ignore
/// async fn handler(body: Result<Json<T>, JsonRejection>) -> Result<..., AppError> {
///     let req = extract_json(body)?;
/// }
/// ```
pub fn extract_json<T>(result: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    result
        .map(|Json(v)| v)
        .map_err(|err| AppError::BadRequest(err.body_text()))
}

/// Extract a JSON body and validate it using the [`Validate`] trait.
pub fn extract_validated_json<T: Validate>(
    result: Result<Json<T>, JsonRejection>,
) -> Result<T, AppError> {
    let value = extract_json(result)?;
    value.validate().map_err(AppError::Validation)?;
    Ok(value)
}

/// Trim an optional text field, mapping blank input to `None`, and check
/// its length in characters.
pub fn optional_text(
    value: &Option<String>,
    field: &str,
    max: usize,
) -> Result<Option<String>, String> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) if text.chars().count() > max => {
            Err(format!("{field} must not exceed {max} characters"))
        }
        Some(text) => Ok(Some(text.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_text_trims_and_drops_blank() {
        assert_eq!(optional_text(&None, "f", 10).unwrap(), None);
        assert_eq!(optional_text(&Some("   ".into()), "f", 10).unwrap(), None);
        assert_eq!(
            optional_text(&Some("  hi ".into()), "f", 10).unwrap(),
            Some("hi".to_string())
        );
    }

    #[test]
    fn optional_text_enforces_length() {
        let err = optional_text(&Some("x".repeat(11)), "description", 10).unwrap_err();
        assert!(err.contains("description"));
    }
}
