use aes_gcm::{
    Aes256Gcm, Key, KeyInit, Nonce,
    aead::{Aead, Payload},
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use rand::RngCore;
use std::sync::Arc;

use crate::error::CryptoError;

const KEY_LEN: usize = 32;
const IV_LEN: usize = 12;
const TAG_LEN: usize = 16;

/// AES-256-GCM over single secret values.
///
/// Payload layout is `base64(iv || tag || ciphertext)`, so rows written by earlier
/// deployments stay readable.
#[derive(Clone)]
pub struct SecretCipher {
    aead: Arc<Aes256Gcm>,
}

impl std::fmt::Debug for SecretCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretCipher(..)")
    }
}

impl SecretCipher {
    /// Key material is padded with `'0'` or truncated to exactly 32 bytes.
    pub fn from_key_material(material: &str) -> Self {
        let mut key = [b'0'; KEY_LEN];
        let bytes = material.as_bytes();
        let n = bytes.len().min(KEY_LEN);
        key[..n].copy_from_slice(&bytes[..n]);

        Self {
            aead: Arc::new(Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key))),
        }
    }

    /// `None` for empty input; nothing is stored for an empty value.
    pub fn encrypt(&self, plain: &str) -> Result<Option<String>, CryptoError> {
        if plain.is_empty() {
            return Ok(None);
        }

        let mut iv = [0u8; IV_LEN];
        rand::rng().fill_bytes(&mut iv);

        // RustCrypto appends the tag: ciphertext || tag.
        let sealed = self
            .aead
            .encrypt(Nonce::from_slice(&iv), plain.as_bytes())
            .map_err(|_| CryptoError::Cipher)?;
        let (ciphertext, tag) = sealed.split_at(sealed.len() - TAG_LEN);

        let mut out = Vec::with_capacity(IV_LEN + sealed.len());
        out.extend_from_slice(&iv);
        out.extend_from_slice(tag);
        out.extend_from_slice(ciphertext);
        Ok(Some(STANDARD.encode(out)))
    }

    pub fn decrypt(&self, payload: &str) -> Result<String, CryptoError> {
        if payload.is_empty() {
            return Ok(String::new());
        }

        let raw = STANDARD.decode(payload)?;
        if raw.len() < IV_LEN + TAG_LEN {
            return Err(CryptoError::Truncated(raw.len()));
        }
        let (iv, rest) = raw.split_at(IV_LEN);
        let (tag, ciphertext) = rest.split_at(TAG_LEN);

        let mut sealed = Vec::with_capacity(rest.len());
        sealed.extend_from_slice(ciphertext);
        sealed.extend_from_slice(tag);

        let plain = self
            .aead
            .decrypt(
                Nonce::from_slice(iv),
                Payload {
                    msg: &sealed,
                    aad: &[],
                },
            )
            .map_err(|_| CryptoError::Cipher)?;
        Ok(String::from_utf8(plain)?)
    }
}
