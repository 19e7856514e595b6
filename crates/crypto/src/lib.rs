//! Zero-storage source encryption for the Argus feed
//!
//! Anonymous sources publish tiered content; access-entitled subscribers
//! decrypt it. No key is ever stored, transmitted, or known to the
//! platform - both ends derive the same symmetric key through pure local
//! computation:
//!
//! - **Identity**: X25519 keypairs derived deterministically from a
//!   wallet signature over a fixed message ([`identity`])
//! - **Agreement**: X25519 Diffie-Hellman between a source and a
//!   subscriber (or tier) identity ([`agreement`])
//! - **Scheduling**: HKDF stretches one DH relationship into a fresh key
//!   per (tier, epoch) window ([`epoch`])
//! - **Sealing**: AES-256-GCM with a fresh one-time content key per
//!   post, wrapped under the epoch key ([`cipher`], [`post`])
//! - **Grants**: a content key re-wrapped for a single recipient outside
//!   the tier schedule ([`grant`])
//!
//! # Security Model
//!
//! ## Access as key derivation
//! There is no permission check anywhere in this crate. A party either
//! holds the inputs to derive the right epoch key - their private key and
//! the correct peer public key, gated externally by tier-pass ownership -
//! or decryption stops at an AEAD tag failure. Revocation works the same
//! way: a lapsed subscriber is not stripped of keys, they simply can no
//! longer obtain the DH inputs for future epochs.
//!
//! ## Zero storage
//! Identity keys are re-derived at every login from the wallet signature;
//! shared secrets and epoch keys are computed on demand and cached at
//! most for a session ([`session::CryptoSession`]); content keys exist
//! only between generation and wrap. Secret-bearing types have no serde
//! support and zeroize on drop.
//!
//! ## Epoch isolation
//! Keys for adjacent epochs and sibling tiers are independent HKDF
//! outputs: compromising one window exposes nothing about any other.

pub mod agreement;
pub mod cipher;
pub mod epoch;
pub mod grant;
pub mod identity;
pub mod post;
pub mod session;

pub mod prelude {
    pub use crate::agreement::{agree, SharedSecret};
    pub use crate::cipher::ContentKey;
    pub use crate::epoch::EpochKey;
    pub use crate::grant::Grant;
    pub use crate::identity::{key_derivation_message, PublicKey, SecretKey};
    pub use crate::post::EncryptedPost;
    pub use crate::session::CryptoSession;
}
