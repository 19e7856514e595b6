//! Post sealing and opening
//!
//! A post is protected by two keys:
//!
//! ```text
//! ContentKey (fresh per post) --seals--> post body
//! EpochKey   (tier, epoch)    --wraps--> ContentKey
//! ```
//!
//! The indirection lets a post's key be re-wrapped for an individual
//! recipient (a [`Grant`](crate::grant::Grant)) without touching the
//! encrypted body. Unwrapping is also the access-control enforcement
//! point: a caller who cannot derive the right epoch key stops at
//! [`CipherError::AuthenticationFailed`] - there is no permission table
//! in front of it.
//!
//! The bundle serializes to JSON for the content store, with byte fields
//! base64/hex encoded. The store treats it as opaque; only the tier and
//! epoch strings are meaningful to the ledger side.

use serde::{Deserialize, Serialize};
use serde_with::base64::Base64;
use serde_with::hex::Hex;
use serde_with::serde_as;

use crate::cipher::{self, CipherError, ContentKey, NONCE_SIZE};
use crate::epoch::EpochKey;

/// Size of the BLAKE3 content hash in bytes
pub const CONTENT_HASH_SIZE: usize = 32;

/// Errors that can occur while sealing or opening a post
#[derive(Debug, thiserror::Error)]
pub enum PostError {
    #[error("cipher error: {0}")]
    Cipher(#[from] CipherError),
    /// The decrypted body does not match the bundle's plaintext
    /// commitment: the bundle metadata was altered after sealing.
    #[error("content hash mismatch")]
    ContentHashMismatch,
}

/// Ciphertext bundle delivered to the content store
///
/// Everything a future reader needs, except the keys: the sealed body,
/// its IV, the wrapped content key, a plaintext commitment, and the
/// (tier, epoch) window the post was sealed for.
///
/// # Examples
///
/// ```ignore
/// let epoch_key = EpochKey::derive(&shared, "press", "2025-06")?;
/// let post = EncryptedPost::seal(b"Operation details...", &epoch_key)?;
///
/// // store side: serde_json::to_vec(&post)
///
/// let plaintext = post.open(&epoch_key)?;
/// ```
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncryptedPost {
    /// AEAD ciphertext of the post body under the one-time content key.
    #[serde_as(as = "Base64")]
    encrypted_content: Vec<u8>,
    /// Nonce the body was sealed with.
    #[serde_as(as = "Hex")]
    iv: [u8; NONCE_SIZE],
    /// Content key in wrap mode under the epoch key.
    #[serde_as(as = "Base64")]
    content_key_wrapped: Vec<u8>,
    /// BLAKE3 commitment to the plaintext, independent of encryption.
    #[serde_as(as = "Hex")]
    content_hash: [u8; CONTENT_HASH_SIZE],
    /// Access tier the post was sealed for.
    tier: String,
    /// Epoch the post was sealed in.
    epoch: String,
}

impl EncryptedPost {
    /// Seal a post under an epoch key.
    ///
    /// Generates a fresh content key and IV, seals the body, wraps the
    /// content key under the epoch key, and commits to the plaintext
    /// with BLAKE3. Each call draws new randomness; sealing the same
    /// content twice never reuses an IV.
    pub fn seal(content: &[u8], epoch_key: &EpochKey) -> Result<Self, PostError> {
        let content_key = ContentKey::generate()?;
        let iv = cipher::random_nonce()?;

        let encrypted_content = cipher::seal(content_key.bytes(), &iv, content)?;
        let content_key_wrapped = cipher::seal_prefixed(epoch_key.bytes(), content_key.bytes())?;
        let content_hash = *blake3::hash(content).as_bytes();

        Ok(Self {
            encrypted_content,
            iv,
            content_key_wrapped,
            content_hash,
            tier: epoch_key.tier().to_string(),
            epoch: epoch_key.epoch().to_string(),
        })
    }

    /// Recover the post's one-time content key.
    ///
    /// This is where access control bites: an epoch key derived from the
    /// wrong DH relationship (or the wrong tier/epoch window) fails the
    /// wrap's tag check.
    ///
    /// # Errors
    ///
    /// [`CipherError::AuthenticationFailed`] via [`PostError::Cipher`]
    /// when the epoch key is wrong or the wrap was tampered with.
    pub fn unwrap_content_key(&self, epoch_key: &EpochKey) -> Result<ContentKey, PostError> {
        let bytes = cipher::open_prefixed(epoch_key.bytes(), &self.content_key_wrapped)?;
        Ok(ContentKey::from_slice(&bytes)?)
    }

    /// Open the post with an epoch key.
    ///
    /// Unwraps the content key, decrypts the body, and verifies the
    /// plaintext commitment.
    pub fn open(&self, epoch_key: &EpochKey) -> Result<Vec<u8>, PostError> {
        let content_key = self.unwrap_content_key(epoch_key)?;
        self.open_with_content_key(&content_key)
    }

    /// Open the post with an already-recovered content key.
    ///
    /// Grant recipients land here: they get the content key from
    /// [`Grant::recover`](crate::grant::Grant::recover) instead of the
    /// epoch schedule.
    pub fn open_with_content_key(&self, key: &ContentKey) -> Result<Vec<u8>, PostError> {
        let plaintext = cipher::open(key.bytes(), &self.iv, &self.encrypted_content)?;
        if *blake3::hash(&plaintext).as_bytes() != self.content_hash {
            return Err(PostError::ContentHashMismatch);
        }
        Ok(plaintext)
    }

    /// The tier this post was sealed for
    pub fn tier(&self) -> &str {
        &self.tier
    }

    /// The epoch this post was sealed in
    pub fn epoch(&self) -> &str {
        &self.epoch
    }

    /// The BLAKE3 commitment to the plaintext
    pub fn content_hash(&self) -> &[u8; CONTENT_HASH_SIZE] {
        &self.content_hash
    }

    /// The body IV (exposed for storage-layer audits)
    pub fn iv(&self) -> &[u8; NONCE_SIZE] {
        &self.iv
    }
}
