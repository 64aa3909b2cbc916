use axum::http::StatusCode;
use thiserror::Error as ThisError;

use super::IsRetryable;

#[derive(Debug, ThisError)]
pub enum AiError {
    #[error("AI API key is not configured")]
    MissingApiKey,

    #[error("AI request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx answer; the status is forwarded to the client.
    #[error("AI API call failed: {status} {body}")]
    UpstreamStatus { status: StatusCode, body: String },

    #[error("AI response is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("AI response contained no choices")]
    NoChoices,

    #[error("工具调用次数过多")]
    TooManyToolCalls,

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),
}

impl AiError {
    pub fn status(&self) -> StatusCode {
        match self {
            AiError::UpstreamStatus { status, .. } => *status,
            AiError::Http(_)
            | AiError::Json(_)
            | AiError::NoChoices
            | AiError::MissingApiKey
            | AiError::TooManyToolCalls
            | AiError::Url(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IsRetryable for AiError {
    fn is_retryable(&self) -> bool {
        match self {
            AiError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            AiError::UpstreamStatus { status, .. } => {
                *status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
            }
            _ => false,
        }
    }
}
