use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum StorageError {
    #[error("object storage {operation} failed: {message}")]
    Sdk {
        operation: &'static str,
        message: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid object key: {0}")]
    InvalidKey(String),

    #[error("object storage misconfigured: {0} not set")]
    Config(String),

    #[error("no free object name for {0}")]
    NamesExhausted(String),
}
