use async_trait::async_trait;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::timeout::TimeoutConfig;
use aws_sdk_s3::config::{BehaviorVersion, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use axum::body::Bytes;
use std::time::Duration;
use tracing::debug;

use super::{IconStore, encode_key, join_url, strip_base};
use crate::config::CosResolvedConfig;
use crate::error::StorageError;

/// Tencent COS bucket reached through the S3-compatible API.
#[derive(Debug, Clone)]
pub struct CosStore {
    client: aws_sdk_s3::Client,
    bucket: String,
    domain: String,
}

impl CosStore {
    pub fn new(cfg: CosResolvedConfig) -> Self {
        let credentials = Credentials::new(
            cfg.secret_id,
            cfg.secret_key,
            None,
            None,
            "softshelf-config",
        );
        let timeouts = TimeoutConfig::builder()
            .connect_timeout(Duration::from_secs(10))
            .operation_timeout(Duration::from_secs(30))
            .build();
        let conf = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(cfg.region))
            .endpoint_url(cfg.endpoint.as_str().trim_end_matches('/'))
            .credentials_provider(credentials)
            .force_path_style(cfg.path_style)
            .timeout_config(timeouts)
            .build();

        Self {
            client: aws_sdk_s3::Client::from_conf(conf),
            bucket: cfg.bucket,
            domain: cfg.domain.to_string(),
        }
    }
}

/// `{bucket}/{encoded key}`, the form `CopyObject` expects.
fn copy_source(bucket: &str, key: &str) -> String {
    format!("{bucket}/{}", encode_key(key))
}

fn sdk_error(operation: &'static str, err: &(impl std::error::Error + 'static)) -> StorageError {
    StorageError::Sdk {
        operation,
        message: DisplayErrorContext(err).to_string(),
    }
}

#[async_trait]
impl IconStore for CosStore {
    fn url_for(&self, key: &str) -> String {
        join_url(&self.domain, key)
    }

    fn key_from_url(&self, url: &str) -> Option<String> {
        strip_base(url, &self.domain)
    }

    async fn put(
        &self,
        key: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<String, StorageError> {
        let size = bytes.len();
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| sdk_error("put", &e))?;
        debug!(key, size, "cos put");
        Ok(self.url_for(key))
    }

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(e) if e.as_service_error().is_some_and(|se| se.is_not_found()) => Ok(false),
            Err(e) => Err(sdk_error("head", &e)),
        }
    }

    async fn copy(&self, from: &str, to: &str) -> Result<(), StorageError> {
        self.client
            .copy_object()
            .bucket(&self.bucket)
            .copy_source(copy_source(&self.bucket, from))
            .key(to)
            .send()
            .await
            .map_err(|e| sdk_error("copy", &e))?;
        debug!(from, to, "cos copy");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| sdk_error("delete", &e))?;
        debug!(key, "cos delete");
        Ok(())
    }
}
