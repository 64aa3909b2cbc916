mod ai;
mod basic;
mod limits;
mod storage;

pub use ai::AiConfig;
pub use basic::BasicConfig;
pub use limits::{LimitsConfig, RateLimitRule};
pub use storage::{
    CosConfig, CosResolvedConfig, LocalStorageConfig, StorageBackend, StorageConfig,
};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, sync::LazyLock};

/// Application configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Core server configuration (see `basic` table in config.toml).
    #[serde(default)]
    pub basic: BasicConfig,

    /// Per-scope request quotas and the secret-access IP allowlist.
    #[serde(default)]
    pub limits: LimitsConfig,

    /// Chat-completion upstream used for generated descriptions and comparisons.
    #[serde(default)]
    pub ai: AiConfig,

    /// Icon object storage.
    #[serde(default)]
    pub storage: StorageConfig,
}

const DEFAULT_CONFIG_FILE: &str = "config.toml";
const ENV_PREFIX: &str = "SOFTSHELF_";

/// Placeholder key material; deployments are expected to override it.
pub const DEV_SECRET_KEY: &str = "dev-secret-key";

impl Config {
    /// Builds a Figment that merges defaults, an optional config TOML file and
    /// `SOFTSHELF_*` environment variables (nested keys separated by `__`,
    /// e.g. `SOFTSHELF_AI__API_KEY`).
    pub fn figment() -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));
        if PathBuf::from(DEFAULT_CONFIG_FILE).is_file() {
            figment = figment.merge(Toml::file(DEFAULT_CONFIG_FILE));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Loads configuration and validates the selected storage backend.
    pub fn load() -> Self {
        let cfg: Self = Self::figment()
            .extract()
            .unwrap_or_else(|err| panic!("failed to extract configuration: {err}"));

        if cfg.storage.backend == StorageBackend::Cos {
            if let Err(missing) = cfg.storage.cos.resolve() {
                panic!("storage.backend = \"cos\" but {missing} not configured");
            }
        }
        cfg
    }

    pub fn uses_dev_secret_key(&self) -> bool {
        self.basic.secret_key == DEV_SECRET_KEY
    }
}

/// Global, lazily-initialized configuration instance.
pub static CONFIG: LazyLock<Config> = LazyLock::new(Config::load);
