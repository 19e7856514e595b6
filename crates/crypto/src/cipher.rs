//! Authenticated encryption primitives
//!
//! AES-256-GCM in two shapes:
//!
//! - **Detached nonce** ([`seal`]/[`open`]): the nonce travels as its own
//!   field next to the ciphertext. Used for post bodies, where the bundle
//!   records the IV separately.
//! - **Wrap mode** ([`seal_prefixed`]/[`open_prefixed`]): the output is
//!   `nonce (12) || ciphertext || tag (16)`, self-describing. Used for
//!   key wrapping, where the wrapped blob must stand alone.
//!
//! Nonces come from the system CSPRNG and are never reused by this
//! module; callers that supply their own nonce own its uniqueness.
//! Decryption is all-or-nothing: a failed tag check yields
//! [`CipherError::AuthenticationFailed`] and no plaintext, and wrong-key
//! and tampered-ciphertext failures are indistinguishable.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Key, Nonce,
};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Size of an AES-256 key in bytes
pub const KEY_SIZE: usize = 32;
/// Size of an AES-GCM nonce in bytes
pub const NONCE_SIZE: usize = 12;
/// Size of the GCM authentication tag in bytes
pub const TAG_SIZE: usize = 16;

/// Errors that can occur during encryption/decryption
#[derive(Debug, thiserror::Error)]
pub enum CipherError {
    /// Tag verification failed: wrong key or tampered ciphertext,
    /// deliberately indistinguishable.
    #[error("authentication failed")]
    AuthenticationFailed,
    #[error("ciphertext too short for nonce prefix")]
    TruncatedCiphertext,
    #[error("invalid key size, expected {expected}, got {0}", expected = KEY_SIZE)]
    InvalidKeySize(usize),
    #[error("failed to draw randomness: {0}")]
    Rng(#[from] getrandom::Error),
}

/// Generate a fresh random nonce from the system CSPRNG.
pub fn random_nonce() -> Result<[u8; NONCE_SIZE], CipherError> {
    let mut nonce = [0u8; NONCE_SIZE];
    getrandom::getrandom(&mut nonce)?;
    Ok(nonce)
}

/// Encrypt with a detached nonce; the tag is appended to the ciphertext.
///
/// The caller is responsible for never reusing `nonce` with the same key.
pub fn seal(
    key: &[u8; KEY_SIZE],
    nonce: &[u8; NONCE_SIZE],
    plaintext: &[u8],
) -> Result<Vec<u8>, CipherError> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
    let Ok(ciphertext) = cipher.encrypt(Nonce::from_slice(nonce), plaintext) else {
        unreachable!("AES-GCM encryption cannot fail for in-memory payloads");
    };
    Ok(ciphertext)
}

/// Decrypt a detached-nonce ciphertext.
///
/// # Errors
///
/// [`CipherError::AuthenticationFailed`] if the tag does not verify.
/// No partial plaintext is ever returned.
pub fn open(
    key: &[u8; KEY_SIZE],
    nonce: &[u8; NONCE_SIZE],
    ciphertext: &[u8],
) -> Result<Vec<u8>, CipherError> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
    cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| CipherError::AuthenticationFailed)
}

/// Encrypt in wrap mode: `nonce || ciphertext || tag`, nonce generated here.
pub fn seal_prefixed(key: &[u8; KEY_SIZE], plaintext: &[u8]) -> Result<Vec<u8>, CipherError> {
    let nonce = random_nonce()?;
    let ciphertext = seal(key, &nonce, plaintext)?;

    let mut out = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    out.extend_from_slice(&nonce);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// Decrypt a wrap-mode blob, extracting the nonce from the prefix.
///
/// # Errors
///
/// [`CipherError::TruncatedCiphertext`] if the blob cannot even hold a
/// nonce and tag; [`CipherError::AuthenticationFailed`] on tag mismatch.
pub fn open_prefixed(key: &[u8; KEY_SIZE], data: &[u8]) -> Result<Vec<u8>, CipherError> {
    if data.len() < NONCE_SIZE + TAG_SIZE {
        return Err(CipherError::TruncatedCiphertext);
    }
    let mut nonce = [0u8; NONCE_SIZE];
    nonce.copy_from_slice(&data[..NONCE_SIZE]);
    open(key, &nonce, &data[NONCE_SIZE..])
}

/// One-time symmetric key for a single post's payload
///
/// Generated fresh for every sealed post, wrapped under an epoch key (or
/// a grant) for transport, and zeroized as soon as it drops. Never
/// reused across posts and never serialized in the clear.
#[derive(Clone, PartialEq, Zeroize, ZeroizeOnDrop)]
pub struct ContentKey([u8; KEY_SIZE]);

impl ContentKey {
    /// Generate a fresh random content key from the system CSPRNG.
    pub fn generate() -> Result<Self, CipherError> {
        let mut key = [0u8; KEY_SIZE];
        getrandom::getrandom(&mut key)?;
        Ok(Self(key))
    }

    /// Create a content key from a byte slice
    ///
    /// # Errors
    ///
    /// Returns an error if the slice is not exactly [`KEY_SIZE`] bytes.
    pub fn from_slice(data: &[u8]) -> Result<Self, CipherError> {
        if data.len() != KEY_SIZE {
            return Err(CipherError::InvalidKeySize(data.len()));
        }
        let mut key = [0u8; KEY_SIZE];
        key.copy_from_slice(data);
        Ok(Self(key))
    }

    /// Get a reference to the raw key bytes
    pub fn bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_seal_open_roundtrip() {
        let key = [7u8; KEY_SIZE];
        let nonce = random_nonce().unwrap();
        let plaintext = b"field report: nothing to report";

        let ciphertext = seal(&key, &nonce, plaintext).unwrap();
        assert_eq!(ciphertext.len(), plaintext.len() + TAG_SIZE);

        let recovered = open(&key, &nonce, &ciphertext).unwrap();
        assert_eq!(recovered, plaintext);
    }

    #[test]
    fn test_wrong_key_fails_hard() {
        let key = [7u8; KEY_SIZE];
        let other = [8u8; KEY_SIZE];
        let nonce = random_nonce().unwrap();

        let ciphertext = seal(&key, &nonce, b"secret").unwrap();
        let result = open(&other, &nonce, &ciphertext);
        assert!(matches!(result, Err(CipherError::AuthenticationFailed)));
    }

    #[test]
    fn test_tampered_ciphertext_fails_hard() {
        let key = [7u8; KEY_SIZE];
        let nonce = random_nonce().unwrap();

        let mut ciphertext = seal(&key, &nonce, b"secret").unwrap();
        ciphertext[0] ^= 0xFF;
        let result = open(&key, &nonce, &ciphertext);
        assert!(matches!(result, Err(CipherError::AuthenticationFailed)));
    }

    #[test]
    fn test_prefixed_roundtrip() {
        let key = [9u8; KEY_SIZE];
        let wrapped = seal_prefixed(&key, b"inner key material").unwrap();
        assert_eq!(wrapped.len(), NONCE_SIZE + b"inner key material".len() + TAG_SIZE);

        let recovered = open_prefixed(&key, &wrapped).unwrap();
        assert_eq!(recovered, b"inner key material");
    }

    #[test]
    fn test_prefixed_truncation_rejected() {
        let key = [9u8; KEY_SIZE];
        let result = open_prefixed(&key, &[0u8; NONCE_SIZE + TAG_SIZE - 1]);
        assert!(matches!(result, Err(CipherError::TruncatedCiphertext)));
    }

    #[test]
    fn test_empty_plaintext() {
        let key = [3u8; KEY_SIZE];
        let nonce = random_nonce().unwrap();
        let ciphertext = seal(&key, &nonce, b"").unwrap();
        assert_eq!(open(&key, &nonce, &ciphertext).unwrap(), b"");
    }

    #[test]
    fn test_nonces_do_not_collide() {
        let mut seen = std::collections::HashSet::new();
        for _ in 0..10_000 {
            assert!(seen.insert(random_nonce().unwrap()), "12-byte nonce collision");
        }
    }

    #[test]
    fn test_content_key_generation_is_random() {
        let a = ContentKey::generate().unwrap();
        let b = ContentKey::generate().unwrap();
        assert_ne!(a.bytes(), b.bytes());
    }

    #[test]
    fn test_content_key_size_validation() {
        assert!(ContentKey::from_slice(&[1u8; 16]).is_err());
        assert!(ContentKey::from_slice(&[1u8; 64]).is_err());
        assert!(ContentKey::from_slice(&[1u8; KEY_SIZE]).is_ok());
    }
}
