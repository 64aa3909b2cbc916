use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::{
    net::{IpAddr, Ipv4Addr},
    path::PathBuf,
};

/// Basic (core) configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BasicConfig {
    /// HTTP server listen address (e.g., "0.0.0.0", "127.0.0.1").
    /// TOML: `basic.listen_addr`. Default: `0.0.0.0`.
    #[serde(default = "default_listen_ip")]
    pub listen_addr: IpAddr,

    /// HTTP server listen port.
    /// TOML: `basic.listen_port`. Default: `3001`.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// Database URL for SQLite.
    /// TOML: `basic.database_url`. Default: `sqlite://softshelf.db`.
    #[serde(default)]
    pub database_url: String,

    /// Log level for tracing subscriber initialization (e.g., "error", "warn", "info", "debug", "trace").
    /// TOML: `basic.loglevel`. Default: `info`.
    #[serde(default)]
    pub loglevel: String,

    /// Key material for AES-256-GCM secret encryption. Padded with `0` or truncated to 32 bytes.
    /// TOML: `basic.secret_key`. Default: `dev-secret-key` (development only).
    #[serde(default)]
    #[serde(deserialize_with = "deserialize_string_lax")]
    pub secret_key: String,

    /// Allowed CORS origins. Empty allows any origin.
    /// TOML: `basic.cors_origins`.
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Maximum accepted request body in bytes (the icon upload route has its own cap).
    /// TOML: `basic.json_limit`. Default: `1048576`.
    #[serde(default = "default_json_limit")]
    pub json_limit: usize,

    /// Built SPA directory; when it exists, non-API paths fall back to its `index.html`.
    /// TOML: `basic.static_dir`. Default: `dist`.
    #[serde(default)]
    pub static_dir: Option<PathBuf>,
}

impl Default for BasicConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_ip(),
            listen_port: default_listen_port(),
            database_url: "sqlite://softshelf.db".to_string(),
            loglevel: "info".to_string(),
            secret_key: super::DEV_SECRET_KEY.to_string(),
            cors_origins: Vec::new(),
            json_limit: default_json_limit(),
            static_dir: Some(PathBuf::from("dist")),
        }
    }
}

fn deserialize_string_lax<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(deserializer)?;

    match v {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(serde::de::Error::custom(
            "expected a string or a number for basic.secret_key",
        )),
    }
}

/// Default IP address for the HTTP server listen address.
fn default_listen_ip() -> IpAddr {
    Ipv4Addr::new(0, 0, 0, 0).into()
}

/// Default port for the HTTP server.
fn default_listen_port() -> u16 {
    3001
}

fn default_json_limit() -> usize {
    1024 * 1024
}
