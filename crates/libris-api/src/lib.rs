use axum::http::{HeaderName, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use libris_core::CoreError;
use libris_storage::StorageError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const JSON_CONTENT_TYPE: &str = "application/json";

/// JSON body returned for every error response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub status: u16,
    pub error: String,
    pub message: String,
}

impl ErrorBody {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status: status.as_u16(),
            error: status
                .canonical_reason()
                .unwrap_or("Unknown")
                .to_string(),
            message: message.into(),
        }
    }
}

/// High-level API errors to be mapped to HTTP responses
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::Internal(msg) => msg,
        }
    }

    pub fn to_body(&self) -> ErrorBody {
        ErrorBody::new(self.status_code(), self.message())
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match &err {
            StorageError::NotFound { .. } => Self::NotFound(err.to_string()),
            StorageError::AlreadyExists { .. } => Self::Conflict(err.to_string()),
            StorageError::InvalidReference { .. } | StorageError::Invalid { .. } => {
                Self::BadRequest(err.to_string())
            }
            StorageError::Internal { .. } => Self::Internal(err.to_string()),
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        if err.is_client_error() {
            Self::BadRequest(err.to_string())
        } else {
            Self::Internal(err.to_string())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "request rejected");
        }

        let body = serde_json::to_vec(&self.to_body()).unwrap_or_else(|_| b"{}".to_vec());

        axum::http::Response::builder()
            .status(status)
            .header(
                header::CONTENT_TYPE,
                HeaderValue::from_static(JSON_CONTENT_TYPE),
            )
            .body(axum::body::Body::from(body))
            .unwrap_or_else(|_| {
                let mut fallback = Response::new(axum::body::Body::from("{}"));
                *fallback.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
                fallback
            })
    }
}

// -------------------------
// API Response Wrapper
// -------------------------

/// JSON response with an explicit status and optional extra headers.
#[derive(Debug, Clone)]
pub struct ApiResponse<T> {
    pub value: T,
    pub status: StatusCode,
    pub headers: Vec<(HeaderName, HeaderValue)>,
}

impl<T> ApiResponse<T> {
    pub fn new(value: T, status: StatusCode) -> Self {
        Self {
            value,
            status,
            headers: Vec::new(),
        }
    }

    pub fn ok(value: T) -> Self {
        Self::new(value, StatusCode::OK)
    }

    pub fn created(value: T) -> Self {
        Self::new(value, StatusCode::CREATED)
    }

    pub fn accepted(value: T) -> Self {
        Self::new(value, StatusCode::ACCEPTED)
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.push((name, value));
        self
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let body = match serde_json::to_vec(&self.value) {
            Ok(b) => b,
            Err(e) => return ApiError::internal(format!("serialization failure: {e}")).into_response(),
        };
        let mut builder = axum::http::Response::builder()
            .status(self.status)
            .header(
                header::CONTENT_TYPE,
                HeaderValue::from_static(JSON_CONTENT_TYPE),
            );
        for (n, v) in self.headers.into_iter() {
            builder = builder.header(n, v);
        }
        builder
            .body(axum::body::Body::from(body))
            .unwrap_or_else(|e| ApiError::internal(e.to_string()).into_response())
    }
}

/// Body of the 202 returned when a report job is accepted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TaskAccepted {
    pub task_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use libris_core::EntityKind;

    #[test]
    fn into_response_sets_status_and_content_type() {
        let resp = ApiError::bad_request("Invalid parameter").into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let content_type = resp.headers().get(header::CONTENT_TYPE).unwrap();
        assert_eq!(content_type, &HeaderValue::from_static(JSON_CONTENT_TYPE));
    }

    #[test]
    fn error_body_shape() {
        let body = ApiError::not_found("author not found with id: 3").to_body();
        assert_eq!(body.status, 404);
        assert_eq!(body.error, "Not Found");
        assert_eq!(body.message, "author not found with id: 3");
    }

    #[test]
    fn storage_errors_map_to_status() {
        let cases: Vec<(StorageError, StatusCode)> = vec![
            (
                StorageError::not_found(EntityKind::Book, 1),
                StatusCode::NOT_FOUND,
            ),
            (
                StorageError::already_exists(EntityKind::Author, "x"),
                StatusCode::CONFLICT,
            ),
            (
                StorageError::invalid_reference(EntityKind::Category, vec![2]),
                StatusCode::BAD_REQUEST,
            ),
            (StorageError::invalid("x"), StatusCode::BAD_REQUEST),
            (
                StorageError::internal("x"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases.into_iter() {
            assert_eq!(ApiError::from(err).status_code(), status);
        }
    }

    #[test]
    fn core_validation_errors_are_bad_requests() {
        let err = ApiError::from(CoreError::invalid_field("name", "must not be blank"));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(err.message().contains("name"));
    }

    #[test]
    fn api_response_can_add_headers() {
        let resp = ApiResponse::accepted(TaskAccepted {
            task_id: "abc".into(),
        })
        .with_header(header::LOCATION, HeaderValue::from_static("/logs/reports/abc/status"))
        .into_response();
        assert_eq!(resp.status(), StatusCode::ACCEPTED);
        assert_eq!(
            resp.headers().get(header::LOCATION).unwrap(),
            &HeaderValue::from_static("/logs/reports/abc/status")
        );
    }

    #[test]
    fn task_accepted_serializes_camel_case() {
        let json = serde_json::to_value(TaskAccepted {
            task_id: "t-1".into(),
        })
        .unwrap();
        assert_eq!(json["taskId"], "t-1");
    }
}
