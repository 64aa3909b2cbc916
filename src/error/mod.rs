mod ai;
mod catalog;
mod crypto;
mod storage;

pub use ai::AiError;
pub use catalog::CatalogError;
pub use crypto::CryptoError;
pub use storage::StorageError;

/// Upper bound for upstream response bodies carried inside errors and logs.
pub const UPSTREAM_BODY_PREVIEW_CHARS: usize = 512;

pub trait IsRetryable {
    fn is_retryable(&self) -> bool;
}

pub(crate) fn body_preview(body: &str) -> String {
    body.chars().take(UPSTREAM_BODY_PREVIEW_CHARS).collect()
}
