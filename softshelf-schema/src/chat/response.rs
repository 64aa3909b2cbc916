use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::ChatMessage;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,

    /// `id`, `usage`, `created` and anything else the provider sends.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatChoice {
    #[serde(default)]
    pub index: u32,
    pub message: ChatMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChatCompletionResponse {
    pub fn first_choice(&self) -> Option<&ChatChoice> {
        self.choices.first()
    }

    /// The model paused to have tools run before it can answer.
    pub fn wants_tool_calls(&self) -> bool {
        self.first_choice()
            .and_then(|c| c.finish_reason.as_deref())
            .is_some_and(|r| r == "tool_calls")
    }
}
