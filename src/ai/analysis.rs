use serde_json::{Value, json};
use softshelf_schema::{
    ChatCompletionResponse, ChatMessage, JsonSchemaFormat, ResponseFormat, Tool,
};
use tracing::debug;

use super::AiClient;
use super::prompts::{self, SoftwareBrief};
use crate::error::AiError;

pub(super) const WEB_SEARCH_TOOL: &str = "$web_search";

/// Tool-call turns allowed before the analysis is abandoned.
const MAX_TOOL_ROUNDS: usize = 6;

pub(super) fn analysis_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "description": { "type": "string", "minLength": 10, "maxLength": 200 },
            "pros": {
                "type": "array",
                "items": { "type": "string", "minLength": 2, "maxLength": 80 },
                "maxItems": 5
            },
            "cons": {
                "type": "array",
                "items": { "type": "string", "minLength": 2, "maxLength": 80 },
                "maxItems": 5
            },
            "systems": {
                "type": "array",
                "items": {
                    "type": "string",
                    "enum": ["Windows", "macOS", "Linux", "Android", "iOS", "HarmonyOS"]
                },
                "maxItems": 6
            }
        },
        "required": ["description"],
        "additionalProperties": false
    })
}

/// Tool arguments re-serialized compactly; unparsable arguments pass through.
fn normalized_arguments(raw: &str) -> String {
    let raw = if raw.trim().is_empty() { "{}" } else { raw };
    serde_json::from_str::<Value>(raw)
        .map(|v| v.to_string())
        .unwrap_or_else(|_| raw.to_string())
}

impl AiClient {
    /// Structured `{description, pros, cons, systems}` analysis. With web search on,
    /// the provider's `$web_search` tool calls are echoed back until it answers.
    pub async fn analyze(&self, software: &SoftwareBrief) -> Result<Value, AiError> {
        let mut request = self.base_request(prompts::analyze_messages(software));
        request.response_format = Some(ResponseFormat::JsonSchema {
            json_schema: JsonSchemaFormat {
                name: "SoftwareAnalysis".to_string(),
                strict: true,
                schema: analysis_schema(),
            },
        });
        if self.enable_web_search {
            request.tools = vec![Tool::builtin(WEB_SEARCH_TOOL)];
        }

        let mut rounds = 0;
        loop {
            let raw = self.complete(&request).await?;
            if !self.enable_web_search {
                return Ok(raw);
            }

            let Some(mut turn) = serde_json::from_value::<ChatCompletionResponse>(raw.clone())
                .ok()
                .filter(ChatCompletionResponse::wants_tool_calls)
            else {
                return Ok(raw);
            };

            rounds += 1;
            if rounds > MAX_TOOL_ROUNDS {
                return Err(AiError::TooManyToolCalls);
            }

            let assistant = turn.choices.swap_remove(0).message;
            let results: Vec<ChatMessage> = assistant
                .tool_calls
                .iter()
                .map(|call| {
                    let mut msg =
                        ChatMessage::tool_result(call, normalized_arguments(&call.function.arguments));
                    if call.function.name.is_empty() {
                        msg.name = Some(WEB_SEARCH_TOOL.to_string());
                    }
                    msg
                })
                .collect();
            debug!(round = rounds, calls = results.len(), "AI requested tool calls");

            request.messages.push(assistant);
            request.messages.extend(results);
        }
    }
}
