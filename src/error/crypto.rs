use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum CryptoError {
    #[error("secret payload is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("secret payload is truncated ({0} bytes)")]
    Truncated(usize),

    /// Authentication failed (tampered payload or wrong key) or encryption failed.
    #[error("secret cipher operation failed")]
    Cipher,

    #[error("decrypted secret is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}
