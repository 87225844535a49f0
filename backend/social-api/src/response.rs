/// Uniform API response envelope
///
/// Every endpoint answers `{message, responseCode, data, errors}` with the
/// HTTP status mirroring `responseCode`.
use actix_web::{http::StatusCode, HttpResponse};
use serde::Serialize;

/// A single request-validation failure
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    pub field: String,
    pub error_message: String,
}

/// Response envelope shared by all endpoints
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T: Serialize> {
    pub message: String,
    pub response_code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Message-only envelope.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            response_code: status.as_u16(),
            data: None,
            errors: None,
        }
    }

    pub fn with_data(mut self, data: T) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_errors(mut self, errors: Vec<FieldError>) -> Self {
        self.errors = Some(errors);
        self
    }

    /// Render as an HTTP response whose status matches `response_code`.
    pub fn into_response(self) -> HttpResponse {
        let status = StatusCode::from_u16(self.response_code)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        HttpResponse::build(status).json(self)
    }
}

/// 200 with data.
pub fn ok<T: Serialize>(message: impl Into<String>, data: T) -> HttpResponse {
    ApiResponse::new(StatusCode::OK, message)
        .with_data(data)
        .into_response()
}

/// 201 with data.
pub fn created<T: Serialize>(message: impl Into<String>, data: T) -> HttpResponse {
    ApiResponse::new(StatusCode::CREATED, message)
        .with_data(data)
        .into_response()
}

/// Message-only response with the given status.
pub fn message(status: StatusCode, message: impl Into<String>) -> HttpResponse {
    ApiResponse::<()>::new(status, message).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_serializes_camel_case() {
        let body = ApiResponse::new(StatusCode::OK, "done").with_data(7);
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["message"], "done");
        assert_eq!(json["responseCode"], 200);
        assert_eq!(json["data"], 7);
        assert!(json.get("errors").is_none());
    }

    #[test]
    fn message_only_envelope_omits_data() {
        let body: ApiResponse<()> = ApiResponse::new(StatusCode::NOT_FOUND, "missing");
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["responseCode"], 404);
        assert!(json.get("data").is_none());
    }

    #[test]
    fn http_status_mirrors_response_code() {
        let response = ApiResponse::new(StatusCode::CREATED, "made")
            .with_data("x")
            .into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
    }
}
