use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

// Boundary errors only; generation itself never fails
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{field} must not be blank")]
    Blank { field: &'static str },
    #[error("{field} must be between {min} and {max} characters")]
    Length {
        field: &'static str,
        min: usize,
        max: usize,
    },
    #[error("provide either {expected}")]
    MissingInput { expected: &'static str },
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::MissingInput { .. } => StatusCode::BAD_REQUEST,
            ApiError::Blank { .. } | ApiError::Length { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        };
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

pub fn require_text(field: &'static str, value: &str, min: usize, max: usize) -> Result<(), ApiError> {
    let len = value.trim().chars().count();
    if len == 0 {
        return Err(ApiError::Blank { field });
    }
    if len < min || len > max {
        return Err(ApiError::Length { field, min, max });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_and_length_checks() {
        assert!(matches!(require_text("name", "   ", 1, 10), Err(ApiError::Blank { .. })));
        assert!(matches!(require_text("name", "abc", 5, 10), Err(ApiError::Length { .. })));
        assert!(require_text("name", " Ada ", 1, 10).is_ok());
    }

    #[test]
    fn renders_as_422() {
        let res = ApiError::Blank { field: "title" }.into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn missing_input_is_400() {
        let res = ApiError::MissingInput { expected: "'messages' or 'message'" }.into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
