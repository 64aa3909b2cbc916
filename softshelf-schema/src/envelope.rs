use serde::{Deserialize, Serialize};

/// `{ "success": true, "data": ... }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSuccess<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiSuccess<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// `{ "success": true, "message": "..." }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiMessage {
    pub success: bool,
    pub message: String,
}

impl ApiMessage {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// `{ "error": "...", "message": "..." }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Reveal endpoint answer: `{ "success": true, "value": "..." }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSecretValue {
    pub success: bool,
    pub value: String,
}

impl ApiSecretValue {
    pub fn new(value: String) -> Self {
        Self {
            success: true,
            value,
        }
    }
}

/// Icon upload answer. `path` is the public URL, `filename` the key without prefix.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiUploadedIcon {
    pub success: bool,
    pub path: String,
    pub filename: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthData {
    pub current_time: String,
}

/// `GET /api/test`: `{ "success", "message", "data": { "current_time" } }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub success: bool,
    pub message: String,
    pub data: HealthData,
}
