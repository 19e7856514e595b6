//! Point-to-point content key grants
//!
//! A grant hands one post's content key to one recipient, outside the
//! tier/epoch schedule entirely - a one-off disclosure to someone who
//! holds no access pass. The source runs X25519 against the recipient's
//! public key, stretches the result with a domain-separated HKDF (so a
//! grant KEK can never collide with an epoch key), and wraps the content
//! key in nonce-prefixed AEAD.
//!
//! Recovery is the mirror image with the roles swapped: the recipient's
//! private key against the source's public key. Anyone else's keypair
//! produces a different KEK and stops at the tag check.
//!
//! # Wire Format
//!
//! ```text
//! [ nonce: 12 bytes ][ wrapped key: 32 bytes ][ tag: 16 bytes ]
//! ```

use hkdf::Hkdf;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::agreement::{agree, AgreementError, SharedSecret};
use crate::cipher::{self, CipherError, ContentKey, KEY_SIZE, NONCE_SIZE, TAG_SIZE};
use crate::identity::{PublicKey, SecretKey};

/// Total size of a grant in bytes
///
/// Layout: nonce (12) || wrapped content key (32) || tag (16)
pub const GRANT_SIZE: usize = NONCE_SIZE + KEY_SIZE + TAG_SIZE;

/// HKDF salt separating grant KEKs from the epoch schedule
const GRANT_SALT: &[u8] = b"grant";
/// HKDF info label for grant key wrapping
const GRANT_INFO: &[u8] = b"content-key-wrap";

/// Errors that can occur while creating or recovering a grant
#[derive(Debug, thiserror::Error)]
pub enum GrantError {
    #[error("agreement error: {0}")]
    Agreement(#[from] AgreementError),
    #[error("cipher error: {0}")]
    Cipher(#[from] CipherError),
    #[error("grant hex decode error")]
    HexDecode,
    #[error("invalid grant size, expected {expected}, got {0}", expected = GRANT_SIZE)]
    InvalidSize(usize),
}

/// A content key wrapped for exactly one recipient
///
/// Produced by the source, decryptable only by the recipient's private
/// key paired with the source's public key.
///
/// # Examples
///
/// ```ignore
/// // source side
/// let content_key = post.unwrap_content_key(&epoch_key)?;
/// let grant = Grant::new(&content_key, &recipient_pub, &source_secret)?;
///
/// // recipient side
/// let content_key = grant.recover(&source_pub, &recipient_secret)?;
/// let plaintext = post.open_with_content_key(&content_key)?;
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Grant(pub(crate) [u8; GRANT_SIZE]);

impl Serialize for Grant {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_bytes(&self.0)
    }
}

impl<'de> Deserialize<'de> for Grant {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::{Error, Visitor};
        use std::fmt;

        struct GrantVisitor;

        impl<'de> Visitor<'de> for GrantVisitor {
            type Value = Grant;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a byte array or sequence of GRANT_SIZE")
            }

            fn visit_bytes<E>(self, v: &[u8]) -> Result<Self::Value, E>
            where
                E: Error,
            {
                if v.len() != GRANT_SIZE {
                    return Err(E::invalid_length(
                        v.len(),
                        &format!("expected {} bytes", GRANT_SIZE).as_str(),
                    ));
                }
                let mut array = [0u8; GRANT_SIZE];
                array.copy_from_slice(v);
                Ok(Grant(array))
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: serde::de::SeqAccess<'de>,
            {
                let mut bytes = Vec::new();
                while let Some(byte) = seq.next_element::<u8>()? {
                    bytes.push(byte);
                }
                if bytes.len() != GRANT_SIZE {
                    return Err(A::Error::invalid_length(
                        bytes.len(),
                        &format!("expected {} bytes", GRANT_SIZE).as_str(),
                    ));
                }
                let mut array = [0u8; GRANT_SIZE];
                array.copy_from_slice(&bytes);
                Ok(Grant(array))
            }
        }

        // Bytes first (bincode/CBOR), sequence fallback (JSON)
        deserializer.deserialize_byte_buf(GrantVisitor)
    }
}

impl Default for Grant {
    fn default() -> Self {
        Grant([0; GRANT_SIZE])
    }
}

impl From<[u8; GRANT_SIZE]> for Grant {
    fn from(bytes: [u8; GRANT_SIZE]) -> Self {
        Grant(bytes)
    }
}

impl From<Grant> for [u8; GRANT_SIZE] {
    fn from(grant: Grant) -> Self {
        grant.0
    }
}

impl TryFrom<&[u8]> for Grant {
    type Error = GrantError;
    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        if bytes.len() != GRANT_SIZE {
            return Err(GrantError::InvalidSize(bytes.len()));
        }
        let mut grant = Grant::default();
        grant.0.copy_from_slice(bytes);
        Ok(grant)
    }
}

/// Stretch a shared secret into the grant-wrapping KEK.
///
/// Domain-separated from [`EpochKey`](crate::epoch::EpochKey) derivation
/// by salt and info, so the two schedules can never produce the same key
/// from the same DH relationship.
fn wrap_key(shared: &SharedSecret) -> Zeroizing<[u8; KEY_SIZE]> {
    let hkdf = Hkdf::<Sha256>::new(Some(GRANT_SALT), shared.bytes());
    let mut kek = Zeroizing::new([0u8; KEY_SIZE]);
    let Ok(()) = hkdf.expand(GRANT_INFO, &mut *kek) else {
        unreachable!("32 bytes is a valid HKDF-SHA256 output length");
    };
    kek
}

impl Grant {
    /// Parse a grant from a hexadecimal string
    ///
    /// Accepts both plain hex and "0x"-prefixed hex strings.
    pub fn from_hex(hex: &str) -> Result<Self, GrantError> {
        let hex = hex.strip_prefix("0x").unwrap_or(hex);
        let mut buff = [0; GRANT_SIZE];
        hex::decode_to_slice(hex, &mut buff).map_err(|_| GrantError::HexDecode)?;
        Ok(Grant::from(buff))
    }

    /// Convert grant to hexadecimal string
    #[allow(clippy::wrong_self_convention)]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Wrap a content key for a specific recipient.
    ///
    /// Static-static exchange: the recipient recovers the key from this
    /// grant plus the source's public key alone, with no extra state to
    /// look up - consistent with the rest of the zero-storage design.
    ///
    /// # Errors
    ///
    /// Returns an error if the recipient key fails curve validation or
    /// the wrap step fails.
    pub fn new(
        content_key: &ContentKey,
        recipient: &PublicKey,
        source_secret: &SecretKey,
    ) -> Result<Self, GrantError> {
        let shared = agree(source_secret, recipient)?;
        let kek = wrap_key(&shared);
        let wrapped = cipher::seal_prefixed(&kek, content_key.bytes())?;

        // wrap mode output is nonce || key || tag, exactly GRANT_SIZE
        Grant::try_from(wrapped.as_slice())
    }

    /// Recover the wrapped content key using the recipient's private key.
    ///
    /// # Errors
    ///
    /// [`CipherError::AuthenticationFailed`] via [`GrantError::Cipher`]
    /// if this grant was made for a different recipient, the source key
    /// is not the one that produced it, or the bytes were tampered with -
    /// the three cases are indistinguishable.
    pub fn recover(
        &self,
        source: &PublicKey,
        recipient_secret: &SecretKey,
    ) -> Result<ContentKey, GrantError> {
        let shared = agree(recipient_secret, source)?;
        let kek = wrap_key(&shared);
        let bytes = cipher::open_prefixed(&kek, &self.0)?;
        Ok(ContentKey::from_slice(&bytes)?)
    }

    /// Get a reference to the raw grant bytes
    pub fn bytes(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::identity::SIGNATURE_SIZE;

    fn keypair(fill: u8) -> SecretKey {
        SecretKey::from_wallet_signature("test.near", &[fill; SIGNATURE_SIZE]).unwrap()
    }

    #[test]
    fn test_grant_roundtrip() {
        let source = keypair(1);
        let recipient = keypair(2);
        let content_key = ContentKey::generate().unwrap();

        let grant = Grant::new(&content_key, &recipient.public(), &source).unwrap();
        let recovered = grant.recover(&source.public(), &recipient).unwrap();
        assert!(recovered == content_key);
    }

    #[test]
    fn test_grant_isolation() {
        let source = keypair(1);
        let intended = keypair(2);
        let interloper = keypair(3);
        let content_key = ContentKey::generate().unwrap();

        let grant = Grant::new(&content_key, &intended.public(), &source).unwrap();

        let result = grant.recover(&source.public(), &interloper);
        assert!(matches!(
            result,
            Err(GrantError::Cipher(CipherError::AuthenticationFailed))
        ));
    }

    #[test]
    fn test_wrong_source_key_fails() {
        let source = keypair(1);
        let recipient = keypair(2);
        let impostor = keypair(4);
        let content_key = ContentKey::generate().unwrap();

        let grant = Grant::new(&content_key, &recipient.public(), &source).unwrap();
        let result = grant.recover(&impostor.public(), &recipient);
        assert!(matches!(
            result,
            Err(GrantError::Cipher(CipherError::AuthenticationFailed))
        ));
    }

    #[test]
    fn test_grant_kek_differs_from_epoch_key() {
        // same DH relationship, different schedules: the grant KEK must
        // never equal any epoch key
        let source = keypair(1);
        let recipient = keypair(2);
        let shared = agree(&source, &recipient.public()).unwrap();

        let kek = wrap_key(&shared);
        let epoch_key =
            crate::epoch::EpochKey::derive(&shared, "grant", "content-key-wrap").unwrap();
        assert_ne!(&*kek, epoch_key.bytes());
    }

    #[test]
    fn test_grant_hex_roundtrip() {
        let source = keypair(1);
        let recipient = keypair(2);
        let content_key = ContentKey::generate().unwrap();

        let grant = Grant::new(&content_key, &recipient.public(), &source).unwrap();
        let hex = grant.to_hex();
        let recovered = Grant::from_hex(&hex).unwrap();
        assert_eq!(grant, recovered);

        let key = recovered.recover(&source.public(), &recipient).unwrap();
        assert!(key == content_key);
    }

    #[test]
    fn test_grant_size_validation() {
        assert!(Grant::try_from([0u8; GRANT_SIZE - 1].as_slice()).is_err());
        assert!(Grant::try_from([0u8; GRANT_SIZE + 1].as_slice()).is_err());
        assert!(Grant::try_from([0u8; GRANT_SIZE].as_slice()).is_ok());
    }

    #[test]
    fn test_grant_serde_json_roundtrip() {
        let source = keypair(1);
        let recipient = keypair(2);
        let content_key = ContentKey::generate().unwrap();
        let grant = Grant::new(&content_key, &recipient.public(), &source).unwrap();

        let json = serde_json::to_string(&grant).unwrap();
        let recovered: Grant = serde_json::from_str(&json).unwrap();
        assert_eq!(grant, recovered);
    }

    #[test]
    fn test_grant_serde_bincode_roundtrip() {
        let source = keypair(1);
        let recipient = keypair(2);
        let content_key = ContentKey::generate().unwrap();
        let grant = Grant::new(&content_key, &recipient.public(), &source).unwrap();

        let binary = bincode::serialize(&grant).unwrap();
        let recovered: Grant = bincode::deserialize(&binary).unwrap();
        assert_eq!(grant, recovered);

        let key = recovered.recover(&source.public(), &recipient).unwrap();
        assert!(key == content_key);
    }
}
