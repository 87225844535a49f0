/// Error types for the Social API
///
/// Every service method returns `Result<T, AppError>`; nothing propagates
/// past the handlers as an unhandled error. The HTTP status always mirrors
/// the `responseCode` carried in the response envelope.
use crate::response::{ApiResponse, FieldError};
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use thiserror::Error;

/// Result type for Social API operations
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error taxonomy
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing account, post, comment or friend request
    #[error("{0}")]
    NotFound(String),

    /// Duplicate email/username/friend request/friendship
    #[error("{0}")]
    Conflict(String),

    /// Authentication failure or acting on someone else's resources
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated but not allowed
    #[error("{0}")]
    Forbidden(String),

    /// Malformed token, invalid ids, bad input
    #[error("{0}")]
    BadRequest(String),

    /// Rolling-window limit exceeded
    #[error("{0}")]
    TooManyRequests(String),

    /// Storage write failed despite valid input
    #[error("{0}")]
    FailedDependency(String),

    /// Per-field request validation failures
    #[error("Validation Errors")]
    Validation(Vec<FieldError>),

    /// Database operation failed
    #[error("Database error: {0}")]
    Database(String),

    /// Unexpected internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Classify a failed write. Unique-key races surface as Conflict, every
    /// other storage failure as FailedDependency with a user-safe message.
    pub fn from_write(err: sqlx::Error, message: &str) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if db.is_unique_violation() {
                return AppError::Conflict(message.to_string());
            }
        }
        tracing::error!(error = %err, "Storage write failed");
        AppError::FailedDependency(message.to_string())
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::TooManyRequests(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::FailedDependency(_) => StatusCode::FAILED_DEPENDENCY,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        let body: ApiResponse<()> = match self {
            AppError::Validation(errors) => {
                ApiResponse::new(status, self.to_string()).with_errors(errors.clone())
            }
            // Internal detail stays in the logs, never in the body.
            AppError::Database(_) | AppError::Internal(_) => ApiResponse::new(
                status,
                "Something bad happened, please try again later.".to_string(),
            ),
            other => ApiResponse::new(status, other.to_string()),
        };

        HttpResponse::build(status).json(body)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!(error = %err, "Database error");
        AppError::Database(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        let errors = err
            .field_errors()
            .into_iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| FieldError {
                    field: field.to_string(),
                    error_message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{} is invalid", field)),
                })
            })
            .collect();
        AppError::Validation(errors)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!(error = %err, "Serialization error");
        AppError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_mirror_the_taxonomy() {
        assert_eq!(
            AppError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Conflict("x".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::Unauthorized("x".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::Forbidden("x".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::TooManyRequests("x".into()).status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            AppError::FailedDependency("x".into()).status_code(),
            StatusCode::FAILED_DEPENDENCY
        );
        assert_eq!(
            AppError::Validation(vec![]).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Database("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_errors_do_not_leak_detail() {
        let err = AppError::Database("connection reset by peer at 10.0.0.3".into());
        let response = err.error_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = actix_web::body::to_bytes(response.into_body());
        let bytes = futures::executor::block_on(body).unwrap();
        let rendered = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(!rendered.contains("10.0.0.3"));
        assert!(rendered.contains("Something bad happened"));
    }

    #[test]
    fn validation_error_renders_field_errors() {
        let err = AppError::Validation(vec![FieldError {
            field: "email".to_string(),
            error_message: "email is invalid".to_string(),
        }]);
        let response = err.error_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes =
            futures::executor::block_on(actix_web::body::to_bytes(response.into_body())).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["message"], "Validation Errors");
        assert_eq!(json["responseCode"], 400);
        assert_eq!(json["errors"][0]["field"], "email");
        assert_eq!(json["errors"][0]["errorMessage"], "email is invalid");
    }
}
