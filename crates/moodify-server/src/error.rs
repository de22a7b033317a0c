use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use moodify_shared::ValidationError;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("{service} is not configured")]
    NotConfigured { service: &'static str },

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Failed to send feedback: {0}")]
    Relay(String),

    #[error("Too many requests")]
    RateLimited,
}

impl From<reqwest::Error> for ServerError {
    fn from(e: reqwest::Error) -> Self {
        ServerError::Upstream(e.to_string())
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ServerError::Validation(_) | ServerError::BadRequest(_) => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            ServerError::RateLimited => (StatusCode::TOO_MANY_REQUESTS, self.to_string()),
            ServerError::Relay(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to send feedback. Please try again later.".to_string(),
            ),
            ServerError::NotConfigured { .. } | ServerError::Upstream(_) => {
                (StatusCode::BAD_GATEWAY, "Upstream service unavailable".to_string())
            }
        };

        let body = serde_json::json!({
            "error": message,
        });

        (status, axum::Json(body)).into_response()
    }
}
