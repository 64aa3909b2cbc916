use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use softshelf_schema::{SecretKind, SecretView};
use uuid::Uuid;

use crate::error::CryptoError;
use crate::utils::serde_ext::{double_option, lax_opt_text, lax_raw_text};

use super::SecretCipher;

/// Shape of one element of the `secrets` JSON column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSecret {
    #[serde(default, deserialize_with = "lax_raw_text")]
    pub id: String,
    #[serde(default)]
    pub kind: SecretKind,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub expires_at: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(rename = "_cipher", default)]
    pub cipher: Option<String>,
}

/// One secret as submitted by the client, plaintext `value` included.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretInput {
    #[serde(default, deserialize_with = "lax_opt_text")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lax_opt_text")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lax_raw_text")]
    pub label: String,
    #[serde(default, deserialize_with = "lax_raw_text")]
    pub notes: String,
    #[serde(default, deserialize_with = "lax_opt_text")]
    pub expires_at: Option<String>,
    /// Missing: untouched. `null`: clear. Blank string: untouched.
    #[serde(default, deserialize_with = "double_option")]
    pub value: Option<Option<Value>>,
}

fn parse_kind(kind: &str) -> SecretKind {
    match kind {
        "license" => SecretKind::License,
        "account" => SecretKind::Account,
        "config" => SecretKind::Config,
        _ => SecretKind::Other,
    }
}

fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn fresh_id() -> String {
    Uuid::new_v4().to_string()
}

/// New entry: every input yields a stored secret. A non-empty string value is
/// encrypted exactly as sent; anything else stores no value.
pub fn normalize_for_insert(
    inputs: Vec<SecretInput>,
    cipher: &SecretCipher,
) -> Result<Vec<StoredSecret>, CryptoError> {
    let now = now_iso();
    inputs
        .into_iter()
        .map(|input| {
            let sealed = match input.value.flatten() {
                Some(Value::String(s)) if !s.is_empty() => cipher.encrypt(&s)?,
                _ => None,
            };
            Ok(StoredSecret {
                id: input.id.unwrap_or_else(fresh_id),
                kind: input.kind.as_deref().map_or(SecretKind::Other, parse_kind),
                label: input.label,
                notes: input.notes,
                expires_at: input.expires_at,
                created_at: now.clone(),
                cipher: sealed,
            })
        })
        .collect()
}

/// Replace the stored list with `inputs`, carrying ciphers and creation times over
/// from `existing` by id. Secrets absent from `inputs` are dropped.
pub fn merge_for_update(
    inputs: Vec<SecretInput>,
    existing: &[StoredSecret],
    cipher: &SecretCipher,
) -> Result<Vec<StoredSecret>, CryptoError> {
    let now = now_iso();
    inputs
        .into_iter()
        .map(|input| {
            let prev = input
                .id
                .as_deref()
                .and_then(|id| existing.iter().find(|s| s.id == id));
            let kept = prev.and_then(|p| p.cipher.clone());

            let sealed = match input.value {
                None => kept,
                Some(None) => None,
                Some(Some(Value::String(s))) if !s.trim().is_empty() => cipher.encrypt(&s)?,
                Some(Some(_)) => kept,
            };

            Ok(StoredSecret {
                id: input.id.unwrap_or_else(fresh_id),
                kind: input
                    .kind
                    .as_deref()
                    .map(parse_kind)
                    .or(prev.map(|p| p.kind))
                    .unwrap_or_default(),
                label: input.label,
                notes: input.notes,
                expires_at: input.expires_at,
                created_at: prev
                    .map(|p| p.created_at.clone())
                    .filter(|c| !c.is_empty())
                    .unwrap_or_else(|| now.clone()),
                cipher: sealed,
            })
        })
        .collect()
}

pub fn mask_for_client(stored: &[StoredSecret]) -> Vec<SecretView> {
    stored
        .iter()
        .map(|s| SecretView {
            id: s.id.clone(),
            kind: s.kind,
            label: s.label.clone(),
            notes: s.notes.clone(),
            expires_at: s.expires_at.clone(),
            created_at: s.created_at.clone(),
            has_value: s.cipher.as_deref().is_some_and(|c| !c.is_empty()),
        })
        .collect()
}
