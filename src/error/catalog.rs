use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::{HeaderValue, StatusCode, header::RETRY_AFTER},
    response::{IntoResponse, Response},
};
use softshelf_schema::ApiErrorBody;
use thiserror::Error as ThisError;
use tracing::{error, warn};

use super::{AiError, CryptoError, StorageError};

/// Request-level error for the catalog API. Renders as `{ "error", "message" }`.
#[derive(Debug, ThisError)]
pub enum CatalogError {
    #[error("{error}: {message}")]
    Validation {
        error: &'static str,
        message: String,
    },

    /// Extractor rejection (malformed JSON, oversized body, bad path segment).
    #[error("Request rejected: {message}")]
    Rejected { status: StatusCode, message: String },

    #[error("missing user id")]
    Unauthorized,

    #[error("client address is not allowlisted")]
    Forbidden,

    #[error("{0}")]
    NotFound(&'static str),

    #[error("rate limit exceeded, retry after {retry_after}s")]
    RateLimited { retry_after: u64 },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("Upload failed: {0}")]
    Upload(#[from] StorageError),

    #[error("{context}: {source}")]
    Ai {
        context: &'static str,
        #[source]
        source: AiError,
    },

    #[error("Ractor error: {0}")]
    RactorError(String),
}

impl CatalogError {
    pub fn validation(error: &'static str, message: impl Into<String>) -> Self {
        CatalogError::Validation {
            error,
            message: message.into(),
        }
    }

    pub fn analyze(source: AiError) -> Self {
        CatalogError::Ai {
            context: "AI分析失败",
            source,
        }
    }

    pub fn compare(source: AiError) -> Self {
        CatalogError::Ai {
            context: "AI对比失败",
            source,
        }
    }
}

fn body(error: impl Into<String>, message: Option<String>) -> Json<ApiErrorBody> {
    Json(ApiErrorBody {
        error: error.into(),
        message,
    })
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        match self {
            CatalogError::Validation { error, message } => {
                (StatusCode::BAD_REQUEST, body(error, Some(message))).into_response()
            }
            CatalogError::Rejected { status, message } => {
                (status, body("无效的请求", Some(message))).into_response()
            }
            CatalogError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                body("未授权", Some("缺少用户ID，请先登录".to_string())),
            )
                .into_response(),
            CatalogError::Forbidden => (StatusCode::FORBIDDEN, body("Forbidden", None)).into_response(),
            CatalogError::NotFound(what) => (StatusCode::NOT_FOUND, body(what, None)).into_response(),
            CatalogError::RateLimited { retry_after } => {
                let mut resp = (
                    StatusCode::TOO_MANY_REQUESTS,
                    body(
                        "Too Many Requests",
                        Some("请求过于频繁，请稍后再试".to_string()),
                    ),
                )
                    .into_response();
                resp.headers_mut()
                    .insert(RETRY_AFTER, HeaderValue::from(retry_after));
                resp
            }
            CatalogError::Database(e) => {
                error!(error = %e, "database operation failed");
                internal("数据库操作失败")
            }
            CatalogError::RactorError(e) => {
                error!(error = %e, "database actor unavailable");
                internal("数据库操作失败")
            }
            CatalogError::Crypto(e) => {
                error!(error = %e, "secret decryption failed");
                internal("密钥解密失败")
            }
            CatalogError::Upload(e) => {
                warn!(error = %e, "icon upload failed");
                (StatusCode::BAD_REQUEST, body("上传失败", Some(e.to_string()))).into_response()
            }
            CatalogError::Ai { context, source } => {
                warn!(context, error = %source, "ai request failed");
                (source.status(), body(context, Some(source.to_string()))).into_response()
            }
        }
    }
}

fn internal(error: &'static str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        body(error, Some("An internal server error occurred.".to_string())),
    )
        .into_response()
}

impl From<JsonRejection> for CatalogError {
    fn from(rejection: JsonRejection) -> Self {
        let message = match &rejection {
            JsonRejection::JsonSyntaxError(_) => "invalid JSON".to_string(),
            JsonRejection::MissingJsonContentType(_) => {
                "expected `Content-Type: application/json`".to_string()
            }
            _ => rejection.body_text(),
        };
        CatalogError::Rejected {
            status: rejection.status(),
            message,
        }
    }
}

impl From<PathRejection> for CatalogError {
    fn from(rejection: PathRejection) -> Self {
        CatalogError::Rejected {
            status: StatusCode::BAD_REQUEST,
            message: rejection.body_text(),
        }
    }
}
