use std::fmt;
use std::ops::Deref;

use sha2::{Digest, Sha256};
use x25519_dalek::{PublicKey as X25519PublicKey, StaticSecret};

/// Size of an X25519 private key in bytes
pub const PRIVATE_KEY_SIZE: usize = 32;
/// Size of an X25519 public key in bytes
pub const PUBLIC_KEY_SIZE: usize = 32;
/// Size of an ed25519 wallet signature in bytes
pub const SIGNATURE_SIZE: usize = 64;

/// Domain tag bound into the wallet-signed key-derivation message
pub const KEY_DOMAIN_TAG: &str = "argus-keygen-v1";

/// Errors that can occur during key derivation or parsing
#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    /// The wallet signature is not a well-formed ed25519 signature.
    #[error("invalid signature: expected {expected} bytes, got {0}", expected = SIGNATURE_SIZE)]
    InvalidSignature(usize),
    #[error("invalid public key size, expected {expected}, got {0}", expected = PUBLIC_KEY_SIZE)]
    InvalidKeySize(usize),
    #[error("public key hex decode error")]
    HexDecode,
    #[error("account id must not be empty")]
    EmptyAccountId,
}

/// The canonical message a wallet must sign to derive its feed keypair.
///
/// The message is deterministic - no timestamp, no nonce - so the wallet
/// produces the same signature on every login and the keypair can be
/// re-derived without ever being stored.
pub fn key_derivation_message(account_id: &str) -> String {
    format!("{KEY_DOMAIN_TAG} | {account_id}")
}

/// Hex-encoded SHA-256 commitment to a source's codename.
///
/// Sources register under this hash so the codename itself never appears
/// on the ledger.
pub fn codename_hash(codename: &str) -> String {
    hex::encode(Sha256::digest(codename.as_bytes()))
}

/// Public half of a party's identity keypair
///
/// Identifies a source or subscriber for key agreement. Safe to publish;
/// the ledger stores it alongside the party's registration.
///
/// # Examples
///
/// ```ignore
/// let secret = SecretKey::from_wallet_signature("alice.near", &signature)?;
/// let public = secret.public();
///
/// // Hex travels through the ledger / content store
/// let hex = public.to_hex();
/// let recovered = PublicKey::from_hex(&hex)?;
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey(X25519PublicKey);

impl Deref for PublicKey {
    type Target = X25519PublicKey;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<[u8; PUBLIC_KEY_SIZE]> for PublicKey {
    fn from(bytes: [u8; PUBLIC_KEY_SIZE]) -> Self {
        PublicKey(X25519PublicKey::from(bytes))
    }
}

impl TryFrom<&[u8]> for PublicKey {
    type Error = KeyError;
    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        if bytes.len() != PUBLIC_KEY_SIZE {
            return Err(KeyError::InvalidKeySize(bytes.len()));
        }
        let mut buff = [0; PUBLIC_KEY_SIZE];
        buff.copy_from_slice(bytes);
        Ok(buff.into())
    }
}

impl PublicKey {
    /// Parse a public key from a hexadecimal string
    ///
    /// Accepts both plain hex and "0x"-prefixed hex strings.
    pub fn from_hex(hex: &str) -> Result<Self, KeyError> {
        let hex = hex.strip_prefix("0x").unwrap_or(hex);
        let mut buff = [0; PUBLIC_KEY_SIZE];
        hex::decode_to_slice(hex, &mut buff).map_err(|_| KeyError::HexDecode)?;
        Ok(buff.into())
    }

    /// Convert public key to raw bytes
    pub fn to_bytes(&self) -> [u8; PUBLIC_KEY_SIZE] {
        self.0.to_bytes()
    }

    /// Convert public key to hexadecimal string
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }
}

/// Private half of a party's identity keypair
///
/// Re-derived from the wallet signature at every login and held only in
/// session memory. There is deliberately no serde support and no on-disk
/// format: losing the process loses nothing, because the wallet can
/// always reproduce the same signature over [`key_derivation_message`].
#[derive(Clone)]
pub struct SecretKey(StaticSecret);

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(..)")
    }
}

impl From<[u8; PRIVATE_KEY_SIZE]> for SecretKey {
    fn from(bytes: [u8; PRIVATE_KEY_SIZE]) -> Self {
        Self(StaticSecret::from(bytes))
    }
}

impl SecretKey {
    /// Derive a keypair from a wallet signature over the canonical message.
    ///
    /// The signature bytes are hashed with SHA-256 to produce the private
    /// scalar seed; the scalar is clamped by the X25519 implementation.
    /// The same `(account_id, signature)` pair always yields the same
    /// keypair.
    ///
    /// # Errors
    ///
    /// Returns an error if the signature is not exactly
    /// [`SIGNATURE_SIZE`] bytes or the account id is empty. Malformed
    /// input is never papered over with randomness.
    pub fn from_wallet_signature(account_id: &str, signature: &[u8]) -> Result<Self, KeyError> {
        if account_id.is_empty() {
            return Err(KeyError::EmptyAccountId);
        }
        if signature.len() != SIGNATURE_SIZE {
            return Err(KeyError::InvalidSignature(signature.len()));
        }
        let seed: [u8; PRIVATE_KEY_SIZE] = Sha256::digest(signature).into();
        Ok(Self(StaticSecret::from(seed)))
    }

    /// Derive the public key from this secret key
    pub fn public(&self) -> PublicKey {
        PublicKey(X25519PublicKey::from(&self.0))
    }

    pub(crate) fn scalar(&self) -> &StaticSecret {
        &self.0
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn test_signature(fill: u8) -> Vec<u8> {
        vec![fill; SIGNATURE_SIZE]
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let sig = test_signature(7);
        let a = SecretKey::from_wallet_signature("alice.near", &sig).unwrap();
        let b = SecretKey::from_wallet_signature("alice.near", &sig).unwrap();
        assert_eq!(a.public().to_bytes(), b.public().to_bytes());
        assert_eq!(a.scalar().to_bytes(), b.scalar().to_bytes());
    }

    #[test]
    fn test_different_signatures_different_keys() {
        let a = SecretKey::from_wallet_signature("alice.near", &test_signature(1)).unwrap();
        let b = SecretKey::from_wallet_signature("alice.near", &test_signature(2)).unwrap();
        assert_ne!(a.public().to_bytes(), b.public().to_bytes());
    }

    #[test]
    fn test_signature_length_is_enforced() {
        let result = SecretKey::from_wallet_signature("alice.near", &[0u8; 63]);
        assert!(matches!(result, Err(KeyError::InvalidSignature(63))));

        let result = SecretKey::from_wallet_signature("alice.near", &[]);
        assert!(matches!(result, Err(KeyError::InvalidSignature(0))));
    }

    #[test]
    fn test_empty_account_rejected() {
        let result = SecretKey::from_wallet_signature("", &test_signature(0));
        assert!(matches!(result, Err(KeyError::EmptyAccountId)));
    }

    #[test]
    fn test_public_key_hex_roundtrip() {
        let secret = SecretKey::from_wallet_signature("alice.near", &test_signature(42)).unwrap();
        let public = secret.public();

        let hex = public.to_hex();
        let recovered = PublicKey::from_hex(&hex).unwrap();
        assert_eq!(public, recovered);

        let prefixed = format!("0x{hex}");
        let recovered = PublicKey::from_hex(&prefixed).unwrap();
        assert_eq!(public, recovered);
    }

    #[test]
    fn test_public_key_size_validation() {
        assert!(PublicKey::try_from([1u8; 16].as_slice()).is_err());
        assert!(PublicKey::try_from([1u8; 64].as_slice()).is_err());
        assert!(PublicKey::try_from([1u8; PUBLIC_KEY_SIZE].as_slice()).is_ok());
    }

    #[test]
    fn test_key_derivation_message_is_constant() {
        let msg = key_derivation_message("alice.near");
        assert_eq!(msg, "argus-keygen-v1 | alice.near");
        assert_eq!(msg, key_derivation_message("alice.near"));
    }

    #[test]
    fn test_codename_hash_is_stable_commitment() {
        let a = codename_hash("NIGHTJAR");
        let b = codename_hash("NIGHTJAR");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert_ne!(a, codename_hash("nightjar"));
    }

    #[test]
    fn test_secret_key_debug_is_redacted() {
        let secret = SecretKey::from_wallet_signature("alice.near", &test_signature(9)).unwrap();
        assert_eq!(format!("{secret:?}"), "SecretKey(..)");
    }
}
