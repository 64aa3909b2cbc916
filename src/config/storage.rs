use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Files under `storage.local.dir`, served by this process at `/icons`.
    #[default]
    Local,
    /// Tencent COS through its S3-compatible API.
    Cos,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// TOML: `storage.backend`. Default: `local`.
    #[serde(default)]
    pub backend: StorageBackend,

    /// Object key prefix for every icon.
    /// TOML: `storage.storage_path`. Default: `AppArchive/`.
    #[serde(default = "default_storage_path")]
    pub storage_path: String,

    #[serde(default)]
    pub local: LocalStorageConfig,

    #[serde(default)]
    pub cos: CosConfig,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            storage_path: default_storage_path(),
            local: LocalStorageConfig::default(),
            cos: CosConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LocalStorageConfig {
    /// TOML: `storage.local.dir`. Default: `public/icons`.
    #[serde(default = "default_local_dir")]
    pub dir: PathBuf,

    /// URL prefix under which stored keys are published, relative or absolute.
    /// TOML: `storage.local.public_base`. Default: `/icons`.
    #[serde(default = "default_public_base")]
    pub public_base: String,
}

impl Default for LocalStorageConfig {
    fn default() -> Self {
        Self {
            dir: default_local_dir(),
            public_base: default_public_base(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CosConfig {
    #[serde(default)]
    pub secret_id: String,
    #[serde(default)]
    pub secret_key: String,
    /// e.g. `image-1250000000`.
    #[serde(default)]
    pub bucket: String,
    /// e.g. `ap-guangzhou`.
    #[serde(default)]
    pub region: String,
    /// Public URL base for stored icons. Defaults to the bucket endpoint.
    #[serde(default)]
    pub domain: Option<Url>,
    /// API endpoint override (S3-compatible gateways). An override is addressed
    /// path-style; the default regional endpoint uses virtual-hosted buckets.
    #[serde(default)]
    pub endpoint: Option<Url>,
}

/// COS settings with every required field present.
#[derive(Debug, Clone)]
pub struct CosResolvedConfig {
    pub secret_id: String,
    pub secret_key: String,
    pub bucket: String,
    pub region: String,
    pub domain: Url,
    pub endpoint: Url,
    pub path_style: bool,
}

impl CosConfig {
    /// Err carries the comma-separated names of the missing fields.
    pub fn resolve(&self) -> Result<CosResolvedConfig, String> {
        let missing: Vec<&str> = [
            ("storage.cos.secret_id", &self.secret_id),
            ("storage.cos.secret_key", &self.secret_key),
            ("storage.cos.bucket", &self.bucket),
            ("storage.cos.region", &self.region),
        ]
        .into_iter()
        .filter(|(_, v)| v.trim().is_empty())
        .map(|(k, _)| k)
        .collect();
        if !missing.is_empty() {
            return Err(missing.join(", "));
        }

        let bucket_host = format!("https://{}.cos.{}.myqcloud.com", self.bucket, self.region);
        let bucket_host = Url::parse(&bucket_host)
            .map_err(|e| format!("storage.cos.bucket/region (invalid host {bucket_host}: {e})"))?;
        let regional = format!("https://cos.{}.myqcloud.com", self.region);
        let regional = Url::parse(&regional)
            .map_err(|e| format!("storage.cos.region (invalid endpoint {regional}: {e})"))?;

        Ok(CosResolvedConfig {
            secret_id: self.secret_id.clone(),
            secret_key: self.secret_key.clone(),
            bucket: self.bucket.clone(),
            region: self.region.clone(),
            domain: self.domain.clone().unwrap_or(bucket_host),
            endpoint: self.endpoint.clone().unwrap_or(regional),
            path_style: self.endpoint.is_some(),
        })
    }
}

fn default_storage_path() -> String {
    "AppArchive/".to_string()
}

fn default_local_dir() -> PathBuf {
    PathBuf::from("public/icons")
}

fn default_public_base() -> String {
    "/icons".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_reports_every_missing_field() {
        let cfg = CosConfig {
            bucket: "icons-1250000000".to_string(),
            ..CosConfig::default()
        };
        assert_eq!(
            cfg.resolve().unwrap_err(),
            "storage.cos.secret_id, storage.cos.secret_key, storage.cos.region"
        );
    }

    #[test]
    fn resolve_derives_domain_from_bucket_and_region() {
        let cfg = CosConfig {
            secret_id: "id".to_string(),
            secret_key: "key".to_string(),
            bucket: "icons-1250000000".to_string(),
            region: "ap-guangzhou".to_string(),
            domain: None,
            endpoint: None,
        };
        let resolved = cfg.resolve().unwrap();
        assert_eq!(
            resolved.domain.as_str(),
            "https://icons-1250000000.cos.ap-guangzhou.myqcloud.com/"
        );
        assert_eq!(resolved.endpoint.as_str(), "https://cos.ap-guangzhou.myqcloud.com/");
        assert!(!resolved.path_style);
    }

    #[test]
    fn endpoint_override_switches_to_path_style() {
        let cfg = CosConfig {
            secret_id: "id".to_string(),
            secret_key: "key".to_string(),
            bucket: "icons".to_string(),
            region: "us-east-1".to_string(),
            domain: None,
            endpoint: Some(Url::parse("http://127.0.0.1:9000").unwrap()),
        };
        let resolved = cfg.resolve().unwrap();
        assert!(resolved.path_style);
        assert_eq!(resolved.endpoint.as_str(), "http://127.0.0.1:9000/");
        assert_eq!(
            resolved.domain.as_str(),
            "https://icons.cos.us-east-1.myqcloud.com/"
        );
    }
}
