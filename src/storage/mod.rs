//! Icon object storage.
//!
//! [`IconStore`] is the object-level seam (put / exists / copy / delete plus the
//! URL <-> key mapping); [`IconManager`] implements the icon lifecycle on top of it.

mod cos;
mod icons;
mod local;
pub mod naming;

pub use cos::CosStore;
pub use icons::{IconManager, UploadedIcon};
pub use local::LocalStore;

use async_trait::async_trait;
use axum::body::Bytes;

use crate::error::StorageError;

#[async_trait]
pub trait IconStore: Send + Sync {
    /// Public URL of `key`.
    fn url_for(&self, key: &str) -> String;

    /// Inverse of [`IconStore::url_for`]; `None` for URLs this store does not own.
    fn key_from_url(&self, url: &str) -> Option<String>;

    /// Store `bytes` at `key` and return its public URL.
    async fn put(&self, key: &str, bytes: Bytes, content_type: &str)
    -> Result<String, StorageError>;

    async fn exists(&self, key: &str) -> Result<bool, StorageError>;

    async fn copy(&self, from: &str, to: &str) -> Result<(), StorageError>;

    /// Deleting a missing object succeeds.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;
}

/// Percent-encode each path segment of `key`, keeping `/` separators.
pub fn encode_key(key: &str) -> String {
    key.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// `{base}/{encoded key}`.
pub(crate) fn join_url(base: &str, key: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), encode_key(key))
}

/// Decoded key of `url` when it lives under `base`.
pub(crate) fn strip_base(url: &str, base: &str) -> Option<String> {
    let base = base.trim_end_matches('/');
    let rest = url.strip_prefix(base)?.strip_prefix('/')?;
    let rest = rest.split(['?', '#']).next().unwrap_or_default();
    let key = urlencoding::decode(rest).ok()?.into_owned();
    (!key.is_empty()).then_some(key)
}
