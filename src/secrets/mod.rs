//! Encrypted secret values attached to software entries.
//!
//! Plaintext only exists in request bodies and in the reveal endpoint's answer.
//! The `secrets` JSON column holds [`StoredSecret`]s whose `_cipher` is produced by
//! [`SecretCipher`]; every other response carries the masked [`SecretView`].
//!
//! [`SecretView`]: softshelf_schema::SecretView

mod cipher;
mod normalize;

pub use cipher::SecretCipher;
pub use normalize::{
    SecretInput, StoredSecret, mask_for_client, merge_for_update, normalize_for_insert,
};
