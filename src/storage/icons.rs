use axum::body::Bytes;
use std::sync::Arc;
use tracing::{info, warn};

use super::naming::{extension_of, is_temporary_icon_key, sanitize_base_name, temporary_icon_name};
use super::{CosStore, IconStore, LocalStore};
use crate::config::{StorageBackend, StorageConfig};
use crate::error::StorageError;

/// Upper bound on `name_1`, `name_2`, ... probes when picking a free key.
const MAX_NAME_PROBES: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedIcon {
    pub url: String,
    /// Key without the storage prefix.
    pub filename: String,
}

/// Icon lifecycle: temporary upload, rename to the owning software's name, and
/// orphan cleanup. Rename and cleanup are best effort and never fail the caller.
#[derive(Clone)]
pub struct IconManager {
    store: Arc<dyn IconStore>,
    storage_path: String,
}

impl IconManager {
    pub fn new(store: Arc<dyn IconStore>, storage_path: impl Into<String>) -> Self {
        Self {
            store,
            storage_path: storage_path.into(),
        }
    }

    pub fn from_config(cfg: &StorageConfig) -> Result<Self, StorageError> {
        let store: Arc<dyn IconStore> = match cfg.backend {
            StorageBackend::Local => Arc::new(LocalStore::new(
                cfg.local.dir.clone(),
                cfg.local.public_base.clone(),
            )),
            StorageBackend::Cos => {
                let resolved = cfg.cos.resolve().map_err(StorageError::Config)?;
                Arc::new(CosStore::new(resolved))
            }
        };
        Ok(Self::new(store, cfg.storage_path.clone()))
    }

    /// Whether `url` points into the configured store.
    pub fn accepts(&self, url: &str) -> bool {
        self.store.key_from_url(url).is_some()
    }

    pub fn is_temporary(&self, url: &str) -> bool {
        self.store
            .key_from_url(url)
            .is_some_and(|key| is_temporary_icon_key(&key))
    }

    pub async fn upload(&self, bytes: Bytes, mime: &str) -> Result<UploadedIcon, StorageError> {
        let filename = temporary_icon_name(mime);
        let key = format!("{}{filename}", self.storage_path);
        let url = self.store.put(&key, bytes, mime).await?;
        Ok(UploadedIcon { url, filename })
    }

    /// Move the icon at `url` to `{prefix}{sanitized name}{ext}` and return the new URL.
    /// Returns `url` unchanged when it is foreign, already named, or storage fails.
    pub async fn rename_for_software(&self, software_name: &str, url: &str) -> String {
        let Some(old_key) = self.store.key_from_url(url) else {
            return url.to_string();
        };
        match self.try_rename(software_name, &old_key).await {
            Ok(Some(new_key)) => {
                info!(old_key = %old_key, new_key = %new_key, "icon renamed");
                self.store.url_for(&new_key)
            }
            Ok(None) => url.to_string(),
            Err(e) => {
                warn!(error = %e, software_name, url, "icon rename failed; keeping original url");
                url.to_string()
            }
        }
    }

    async fn try_rename(
        &self,
        software_name: &str,
        old_key: &str,
    ) -> Result<Option<String>, StorageError> {
        let ext = extension_of(old_key);
        let base = sanitize_base_name(software_name);

        for index in 0..MAX_NAME_PROBES {
            let candidate = if index == 0 {
                format!("{}{base}{ext}", self.storage_path)
            } else {
                format!("{}{base}_{index}{ext}", self.storage_path)
            };
            if candidate == old_key {
                return Ok(None);
            }
            if !self.store.exists(&candidate).await? {
                self.store.copy(old_key, &candidate).await?;
                self.store.delete(old_key).await?;
                return Ok(Some(candidate));
            }
        }

        Err(StorageError::NamesExhausted(format!("{base}{ext}")))
    }

    /// Delete the object behind `url` if it belongs to the store.
    pub async fn discard(&self, url: &str) {
        let Some(key) = self.store.key_from_url(url) else {
            return;
        };
        match self.store.delete(&key).await {
            Ok(()) => info!(key = %key, "icon deleted"),
            Err(e) => warn!(error = %e, key = %key, "icon delete failed"),
        }
    }
}
