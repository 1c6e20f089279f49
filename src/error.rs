use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

const INTERNAL_DETAIL: &str = "Internal server error while contacting the upstream API.";

// Failures of the outbound call, all surface as 502
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("Upstream error: {status} - {body}")]
    Status { status: u16, body: String },

    #[error("Upstream error: request timed out")]
    Timeout,

    #[error("Upstream error: {0}")]
    Transport(String),
}

impl UpstreamError {
    pub fn status(&self) -> Option<u16> {
        match self {
            UpstreamError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            UpstreamError::Timeout
        } else {
            UpstreamError::Transport(err.to_string())
        }
    }
}

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Message is empty.")]
    EmptyMessage,

    #[error("Too many requests, slow down.")]
    RateLimited,

    #[error("Server missing GEMINI_API_KEY environment variable.")]
    MissingApiKey,

    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, ChatError>;

impl ChatError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ChatError::EmptyMessage => StatusCode::BAD_REQUEST,
            ChatError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ChatError::MissingApiKey | ChatError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ChatError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            ChatError::Internal(detail) => {
                error!(%detail, "unexpected failure handling chat request");
                json!({ "detail": INTERNAL_DETAIL })
            }
            ChatError::Upstream(err) => json!({
                "detail": err.to_string(),
                "upstream_status": err.status(),
            }),
            other => json!({ "detail": other.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_kind_maps_to_its_status() {
        assert_eq!(ChatError::EmptyMessage.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ChatError::RateLimited.status_code(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            ChatError::MissingApiKey.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ChatError::Internal("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ChatError::from(UpstreamError::Timeout).status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn upstream_status_error_embeds_status_and_body() {
        let err = UpstreamError::Status {
            status: 503,
            body: "overloaded".into(),
        };
        assert_eq!(err.status(), Some(503));
        assert_eq!(err.to_string(), "Upstream error: 503 - overloaded");
        assert_eq!(UpstreamError::Transport("reset".into()).status(), None);
    }
}
