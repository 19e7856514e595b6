//! X25519 key agreement between two identities
//!
//! A source and a subscriber (or the tier-issuing identity) each hold a
//! wallet-derived keypair. Running Diffie-Hellman over those keys gives
//! both sides the same [`SharedSecret`] with no message exchange; the
//! epoch scheduler then stretches that secret into per-(tier, epoch)
//! keys. Nothing here is ever persisted - the secret is recomputed on
//! demand and zeroized on drop.

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::identity::{PublicKey, SecretKey};

/// Size of the Diffie-Hellman output in bytes
pub const SHARED_SECRET_SIZE: usize = 32;

/// Errors that can occur during key agreement
#[derive(Debug, thiserror::Error)]
pub enum AgreementError {
    /// The peer key is a small-order point: the exchange would produce a
    /// secret the peer never contributed to.
    #[error("invalid public key: non-contributory key agreement")]
    InvalidPublicKey,
}

/// Diffie-Hellman output between two identities
///
/// Symmetric by construction: `agree(a_priv, b_pub)` and
/// `agree(b_priv, a_pub)` produce identical bytes. Ephemeral - callers
/// recompute it per operation (or cache it inside a
/// [`CryptoSession`](crate::session::CryptoSession)) and the bytes are
/// zeroized when dropped. There is no serde support on purpose.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SharedSecret([u8; SHARED_SECRET_SIZE]);

impl SharedSecret {
    /// Get a reference to the raw secret bytes
    pub fn bytes(&self) -> &[u8; SHARED_SECRET_SIZE] {
        &self.0
    }
}

/// Perform X25519 key agreement with a peer.
///
/// Constant-time scalar multiplication via `x25519-dalek`.
///
/// # Errors
///
/// Returns [`AgreementError::InvalidPublicKey`] if the peer key lies on
/// a small-order subgroup. Rejecting these keys is security-critical:
/// a degenerate peer key would collapse the shared secret to a value an
/// attacker can predict.
pub fn agree(secret: &SecretKey, peer: &PublicKey) -> Result<SharedSecret, AgreementError> {
    let shared = secret.scalar().diffie_hellman(peer);
    if !shared.was_contributory() {
        return Err(AgreementError::InvalidPublicKey);
    }
    Ok(SharedSecret(shared.to_bytes()))
}
