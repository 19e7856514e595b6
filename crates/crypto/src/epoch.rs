//! Epoch key scheduling
//!
//! Stretches one long-lived Diffie-Hellman relationship into a fresh
//! symmetric key per (tier, epoch) window via HKDF-SHA256. The salt
//! binds the key to the access window, so:
//!
//! - a compromised epoch key exposes nothing about adjacent epochs
//! - a lapsed subscriber never re-derives future keys; the key is not
//!   revoked or deleted, they simply lose the DH inputs for it
//!
//! Epoch identifiers are opaque strings here (`"2025-06"` under the
//! default calendar-month policy). The calendar rule belongs to the
//! caller, not this module.

use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::agreement::SharedSecret;

/// Size of a derived epoch key in bytes
pub const EPOCH_KEY_SIZE: usize = 32;

/// HKDF info label for epoch key expansion
const EPOCH_KEY_INFO: &[u8] = b"epoch-key";

/// Errors that can occur during epoch key derivation
#[derive(Debug, thiserror::Error)]
pub enum EpochError {
    #[error("tier must not be empty")]
    EmptyTier,
    #[error("epoch must not be empty")]
    EmptyEpoch,
}

/// Symmetric key valid for one (tier, epoch) pair
///
/// Any party who can compute the same [`SharedSecret`] re-derives the
/// identical key; nobody else can. Carries its tier and epoch so a
/// sealed post can record which window it belongs to. Zeroized on drop,
/// never serialized.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct EpochKey {
    key: [u8; EPOCH_KEY_SIZE],
    tier: String,
    epoch: String,
}

impl EpochKey {
    /// Derive the key for a (tier, epoch) window from a shared secret.
    ///
    /// HKDF-SHA256 with `salt = tier || "|" || epoch` and a fixed info
    /// label. Deterministic: both ends of the DH relationship derive
    /// bit-identical keys.
    ///
    /// # Errors
    ///
    /// Returns an error if `tier` or `epoch` is empty.
    pub fn derive(shared: &SharedSecret, tier: &str, epoch: &str) -> Result<Self, EpochError> {
        if tier.is_empty() {
            return Err(EpochError::EmptyTier);
        }
        if epoch.is_empty() {
            return Err(EpochError::EmptyEpoch);
        }

        let mut salt = Vec::with_capacity(tier.len() + 1 + epoch.len());
        salt.extend_from_slice(tier.as_bytes());
        salt.push(b'|');
        salt.extend_from_slice(epoch.as_bytes());

        let hkdf = Hkdf::<Sha256>::new(Some(&salt), shared.bytes());
        let mut key = [0u8; EPOCH_KEY_SIZE];
        let Ok(()) = hkdf.expand(EPOCH_KEY_INFO, &mut key) else {
            unreachable!("32 bytes is a valid HKDF-SHA256 output length");
        };

        Ok(Self {
            key,
            tier: tier.to_string(),
            epoch: epoch.to_string(),
        })
    }

    /// Get a reference to the raw key bytes
    pub fn bytes(&self) -> &[u8; EPOCH_KEY_SIZE] {
        &self.key
    }

    /// The tier this key is scoped to
    pub fn tier(&self) -> &str {
        &self.tier
    }

    /// The epoch this key is scoped to
    pub fn epoch(&self) -> &str {
        &self.epoch
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::agreement::agree;
    use crate::identity::{SecretKey, SIGNATURE_SIZE};

    fn shared() -> SharedSecret {
        let alice = SecretKey::from_wallet_signature("alice.near", &[1; SIGNATURE_SIZE]).unwrap();
        let bob = SecretKey::from_wallet_signature("bob.near", &[2; SIGNATURE_SIZE]).unwrap();
        agree(&alice, &bob.public()).unwrap()
    }

    #[test]
    fn test_derive_is_deterministic() {
        let s = shared();
        let a = EpochKey::derive(&s, "press", "2025-06").unwrap();
        let b = EpochKey::derive(&s, "press", "2025-06").unwrap();
        assert_eq!(a.bytes(), b.bytes());
        assert_eq!(a.tier(), "press");
        assert_eq!(a.epoch(), "2025-06");
    }

    #[test]
    fn test_epochs_are_independent() {
        let s = shared();
        let jan = EpochKey::derive(&s, "press", "2025-01").unwrap();
        let feb = EpochKey::derive(&s, "press", "2025-02").unwrap();
        assert_ne!(jan.bytes(), feb.bytes());
    }

    #[test]
    fn test_tiers_are_independent() {
        let s = shared();
        let press = EpochKey::derive(&s, "press", "2025-01").unwrap();
        let vip = EpochKey::derive(&s, "vip", "2025-01").unwrap();
        assert_ne!(press.bytes(), vip.bytes());
    }

    #[test]
    fn test_no_collisions_across_windows() {
        let s = shared();
        let mut seen = std::collections::HashSet::new();
        for tier in ["free", "bronze", "silver", "gold", "press", "vip"] {
            for month in 1..=12 {
                let key = EpochKey::derive(&s, tier, &format!("2025-{month:02}")).unwrap();
                assert!(seen.insert(*key.bytes()), "collision at {tier}/2025-{month:02}");
            }
        }
    }

    #[test]
    fn test_empty_inputs_rejected() {
        let s = shared();
        assert!(matches!(EpochKey::derive(&s, "", "2025-01"), Err(EpochError::EmptyTier)));
        assert!(matches!(EpochKey::derive(&s, "press", ""), Err(EpochError::EmptyEpoch)));
    }
}
