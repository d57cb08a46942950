//! JSON error responses

use autoblog_core::AutoblogError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;

/// An error on its way out of a handler
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub code: &'static str,
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, error: impl Into<String>) -> Self {
        Self {
            status,
            error: error.into(),
            code,
            details: None,
        }
    }

    pub fn bad_request(error: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "VALIDATION_FAILED", error)
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl From<AutoblogError> for ApiError {
    fn from(err: AutoblogError) -> Self {
        let code = err.code();
        let details = err.to_string();
        let (status, error) = match &err {
            AutoblogError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AutoblogError::Auth(_) => (
                StatusCode::UNAUTHORIZED,
                "Invalid API key. Please check your Gemini API key configuration.".to_string(),
            ),
            AutoblogError::QuotaExceeded(_) => (
                StatusCode::TOO_MANY_REQUESTS,
                "Content generation quota exceeded. Please try again later.".to_string(),
            ),
            AutoblogError::Generation(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to generate content. Please try again later.".to_string(),
            ),
            AutoblogError::RateLimited(_) => (StatusCode::TOO_MANY_REQUESTS, "Too many requests".to_string()),
            AutoblogError::BlogNotFound(id) => (StatusCode::NOT_FOUND, format!("Blog {} not found", id)),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string()),
        };

        Self {
            status,
            error,
            code,
            details: Some(details),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = json!({
            "success": false,
            "error": self.error,
            "code": self.code,
        });
        if let Some(details) = self.details {
            body["details"] = json!(details);
        }
        (self.status, Json(body)).into_response()
    }
}
