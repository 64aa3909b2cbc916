pub mod catalog;
pub mod chat;
pub mod envelope;

pub use catalog::{
    ComparisonAnalysisView, ComparisonGroupView, RelatedSoftwareView, SecretKind, SecretView,
    SoftwareView,
};
pub use chat::{
    ChatChoice, ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ChatRole,
    JsonSchemaFormat, ResponseFormat, Tool, ToolCall, ToolCallFunction, ToolFunction,
};
pub use envelope::{
    ApiErrorBody, ApiMessage, ApiSecretValue, ApiSuccess, ApiUploadedIcon, HealthData,
    HealthResponse,
};
