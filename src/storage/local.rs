use async_trait::async_trait;
use axum::body::Bytes;
use std::path::{Path, PathBuf};
use tokio::fs;

use super::{IconStore, join_url, strip_base};
use crate::error::StorageError;

/// Icons as plain files under `root`, published at `{public_base}/{key}`.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
    public_base: String,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>, public_base: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base: public_base.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && !key.starts_with('/')
            && !key.contains('\\')
            && key
                .split('/')
                .all(|seg| !seg.is_empty() && seg != "." && seg != "..");
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(key))
    }
}

async fn ensure_parent(path: &Path) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    Ok(())
}

#[async_trait]
impl IconStore for LocalStore {
    fn url_for(&self, key: &str) -> String {
        join_url(&self.public_base, key)
    }

    fn key_from_url(&self, url: &str) -> Option<String> {
        let key = strip_base(url, &self.public_base)?;
        self.path_for(&key).ok().map(|_| key)
    }

    async fn put(
        &self,
        key: &str,
        bytes: Bytes,
        _content_type: &str,
    ) -> Result<String, StorageError> {
        let path = self.path_for(key)?;
        ensure_parent(&path).await?;
        fs::write(&path, &bytes).await?;
        Ok(self.url_for(key))
    }

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        Ok(fs::try_exists(self.path_for(key)?).await?)
    }

    async fn copy(&self, from: &str, to: &str) -> Result<(), StorageError> {
        let (src, dst) = (self.path_for(from)?, self.path_for(to)?);
        ensure_parent(&dst).await?;
        fs::copy(&src, &dst).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)?).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
