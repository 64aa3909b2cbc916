use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// `max` requests per `window_secs`, tracked per user (or client IP).
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
pub struct RateLimitRule {
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
    pub max: u32,
}

impl RateLimitRule {
    const fn per_window(max: u32) -> Self {
        Self {
            window_secs: DEFAULT_WINDOW_SECS,
            max,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LimitsConfig {
    /// Catalog and comparison mutations.
    /// TOML: `limits.write`. Default: 300 per 15 minutes.
    #[serde(default = "default_write")]
    pub write: RateLimitRule,

    /// Icon uploads.
    /// TOML: `limits.upload`. Default: 20 per 15 minutes.
    #[serde(default = "default_upload")]
    pub upload: RateLimitRule,

    /// AI analyze/compare calls.
    /// TOML: `limits.ai`. Default: 40 per 15 minutes.
    #[serde(default = "default_ai")]
    pub ai: RateLimitRule,

    /// Secret plaintext reveals, keyed by client IP only.
    /// TOML: `limits.secret`. Default: 30 per 15 minutes.
    #[serde(default = "default_secret")]
    pub secret: RateLimitRule,

    /// Client IPs allowed to reveal secrets. Empty allows every client.
    /// TOML: `limits.ip_whitelist`.
    #[serde(default)]
    pub ip_whitelist: Vec<IpAddr>,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            write: default_write(),
            upload: default_upload(),
            ai: default_ai(),
            secret: default_secret(),
            ip_whitelist: Vec::new(),
        }
    }
}

const DEFAULT_WINDOW_SECS: u64 = 15 * 60;

fn default_window_secs() -> u64 {
    DEFAULT_WINDOW_SECS
}

fn default_write() -> RateLimitRule {
    RateLimitRule::per_window(300)
}

fn default_upload() -> RateLimitRule {
    RateLimitRule::per_window(20)
}

fn default_ai() -> RateLimitRule {
    RateLimitRule::per_window(40)
}

fn default_secret() -> RateLimitRule {
    RateLimitRule::per_window(30)
}
