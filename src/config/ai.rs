use serde::{Deserialize, Serialize};
use url::Url;

/// Chat-completion upstream (OpenAI-compatible; Kimi / Moonshot by default).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AiConfig {
    /// API base; `/chat/completions` is appended.
    /// TOML: `ai.api_base`. Default: `https://api.moonshot.cn/v1`.
    #[serde(default = "default_api_base")]
    pub api_base: Url,

    /// Bearer key. AI routes answer 500 while unset.
    /// TOML: `ai.api_key`.
    #[serde(default)]
    pub api_key: Option<String>,

    /// TOML: `ai.model`. Default: `kimi-k2-0905-preview`.
    #[serde(default = "default_model")]
    pub model: String,

    /// TOML: `ai.temperature`. Default: `0.6`.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// TOML: `ai.max_tokens`. Default: `1024`.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Offer the provider's builtin `$web_search` tool during analysis.
    /// TOML: `ai.enable_web_search`. Default: `true`.
    #[serde(default = "default_enable_web_search")]
    pub enable_web_search: bool,

    /// Extra attempts after a transport error, 429 or 5xx.
    /// TOML: `ai.retry_max_times`. Default: `2`.
    #[serde(default = "default_retry_max_times")]
    pub retry_max_times: usize,

    /// Fixed delay between attempts.
    /// TOML: `ai.retry_delay_ms`. Default: `1000`.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Optional upstream HTTP proxy.
    /// TOML: `ai.proxy`. Example: `http://127.0.0.1:1080`.
    #[serde(default)]
    pub proxy: Option<Url>,

    /// Whole-request timeout for one upstream call.
    /// TOML: `ai.timeout_secs`. Default: `120`.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl AiConfig {
    pub fn completions_url(&self) -> Result<Url, url::ParseError> {
        let base = self.api_base.as_str().trim_end_matches('/');
        Url::parse(&format!("{base}/chat/completions"))
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            api_key: None,
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            enable_web_search: default_enable_web_search(),
            retry_max_times: default_retry_max_times(),
            retry_delay_ms: default_retry_delay_ms(),
            proxy: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_api_base() -> Url {
    Url::parse("https://api.moonshot.cn/v1").expect("valid default AI api base")
}

fn default_model() -> String {
    "kimi-k2-0905-preview".to_string()
}

fn default_temperature() -> f32 {
    0.6
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_enable_web_search() -> bool {
    true
}

fn default_retry_max_times() -> usize {
    2
}

fn default_retry_delay_ms() -> u64 {
    1000
}

fn default_timeout_secs() -> u64 {
    120
}
