use axum::body::Bytes;
use backon::{ConstantBuilder, Retryable};
use reqwest::header::AUTHORIZATION;
use serde_json::Value;
use softshelf_schema::{ChatCompletionRequest, ChatMessage};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use super::prompts::{self, SoftwareBrief};
use crate::config::AiConfig;
use crate::error::{AiError, IsRetryable, body_preview};
use crate::utils::http::build_client;
use crate::utils::logging::with_pretty_json_debug;

#[derive(Debug, Clone)]
pub struct AiClient {
    http: reqwest::Client,
    completions_url: Url,
    api_key: Option<String>,
    model: String,
    temperature: f32,
    max_tokens: u32,
    pub(super) enable_web_search: bool,
    retry_max_times: usize,
    retry_delay: Duration,
}

impl AiClient {
    pub fn from_config(cfg: &AiConfig) -> Result<Self, AiError> {
        let http = build_client(
            cfg.proxy.as_ref(),
            Some(Duration::from_secs(cfg.timeout_secs)),
        )?;
        Ok(Self {
            http,
            completions_url: cfg.completions_url()?,
            api_key: cfg.api_key.clone().filter(|k| !k.trim().is_empty()),
            model: cfg.model.clone(),
            temperature: cfg.temperature,
            max_tokens: cfg.max_tokens,
            enable_web_search: cfg.enable_web_search,
            retry_max_times: cfg.retry_max_times,
            retry_delay: Duration::from_millis(cfg.retry_delay_ms),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub(super) fn base_request(&self, messages: Vec<ChatMessage>) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            response_format: None,
            tools: Vec::new(),
        }
    }

    fn retry_policy(&self) -> ConstantBuilder {
        ConstantBuilder::default()
            .with_delay(self.retry_delay)
            .with_max_times(self.retry_max_times)
    }

    pub fn build_request(
        &self,
        api_key: &str,
        body: &ChatCompletionRequest,
    ) -> Result<reqwest::Request, reqwest::Error> {
        self.http
            .post(self.completions_url.clone())
            .header(AUTHORIZATION, format!("Bearer {api_key}"))
            .json(body)
            .build()
    }

    /// POST one completion and return the upstream JSON untouched.
    pub async fn complete(&self, body: &ChatCompletionRequest) -> Result<Value, AiError> {
        let api_key = self.api_key.as_deref().ok_or(AiError::MissingApiKey)?;

        with_pretty_json_debug(body, |json| {
            debug!(url = %self.completions_url, body = %json, "AI request");
        });

        let bytes = (|| async move {
            let req = self.build_request(api_key, body)?;
            let resp = self.http.execute(req).await?;
            let status = resp.status();
            if !status.is_success() {
                let text = resp.text().await.unwrap_or_default();
                return Err(AiError::UpstreamStatus {
                    status,
                    body: body_preview(&text),
                });
            }
            Ok::<Bytes, AiError>(resp.bytes().await?)
        })
        .retry(self.retry_policy())
        .when(AiError::is_retryable)
        .notify(|err, delay| {
            warn!(error = %err, ?delay, "AI upstream error (will retry)");
        })
        .await?;

        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Markdown comparison of two or more entries.
    pub async fn compare(&self, softwares: &[SoftwareBrief]) -> Result<Value, AiError> {
        let request = self.base_request(prompts::compare_messages(softwares));
        self.complete(&request).await
    }
}
