//! Caller-owned session context
//!
//! [`CryptoSession`] holds everything a logged-in party needs: the
//! wallet-derived keypair plus caches of shared secrets and epoch keys,
//! so a feed of posts does not redo a DH exchange per item. The caches
//! live only as long as the session value - nothing is ever written to
//! durable storage, and [`CryptoSession::logout`] drops all cached key
//! material early. Key types zeroize themselves on drop.
//!
//! The session is plain owned state behind `&mut self`. Operations on
//! different posts are independent; callers that want parallelism run
//! one session per worker (cheap - login is one hash) instead of
//! sharing one behind a lock.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::agreement::{agree, AgreementError, SharedSecret};
use crate::epoch::{EpochError, EpochKey};
use crate::grant::{Grant, GrantError};
use crate::identity::{KeyError, PublicKey, SecretKey};
use crate::post::{EncryptedPost, PostError};

/// Errors surfaced by session operations
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("key error: {0}")]
    Key(#[from] KeyError),
    #[error("agreement error: {0}")]
    Agreement(#[from] AgreementError),
    #[error("epoch error: {0}")]
    Epoch(#[from] EpochError),
    #[error("post error: {0}")]
    Post(#[from] PostError),
    #[error("grant error: {0}")]
    Grant(#[from] GrantError),
}

/// A logged-in party's crypto context
///
/// Created once per login from the wallet signature, used for every
/// seal/open in the session, and dropped (or [`logout`](Self::logout))
/// when the session ends.
///
/// # Examples
///
/// ```ignore
/// let mut session = CryptoSession::login("alice.near", &signature)?;
/// let post = session.seal_post(&subscriber_pub, "press", "2025-06", b"...")?;
/// // ... subscriber side ...
/// let mut session = CryptoSession::login("bob.near", &bob_signature)?;
/// let plaintext = session.open_post(&source_pub, &post)?;
/// ```
pub struct CryptoSession {
    account_id: String,
    secret: SecretKey,
    shared: HashMap<PublicKey, SharedSecret>,
    epoch_keys: HashMap<(PublicKey, String, String), EpochKey>,
}

impl CryptoSession {
    /// Open a session by re-deriving the identity keypair from the
    /// wallet signature over [`key_derivation_message`](crate::identity::key_derivation_message).
    pub fn login(account_id: &str, signature: &[u8]) -> Result<Self, SessionError> {
        let secret = SecretKey::from_wallet_signature(account_id, signature)?;
        tracing::debug!(account = account_id, "crypto session opened");
        Ok(Self {
            account_id: account_id.to_string(),
            secret,
            shared: HashMap::new(),
            epoch_keys: HashMap::new(),
        })
    }

    /// The account this session belongs to
    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    /// This session's public identity
    pub fn public_key(&self) -> PublicKey {
        self.secret.public()
    }

    /// Shared secret with a peer, computed once per session per peer.
    pub fn shared_secret(&mut self, peer: &PublicKey) -> Result<&SharedSecret, SessionError> {
        match self.shared.entry(*peer) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                tracing::debug!(peer = %peer.to_hex(), "deriving shared secret");
                Ok(entry.insert(agree(&self.secret, peer)?))
            }
        }
    }

    /// Epoch key for a (peer, tier, epoch) triple, cached per session.
    pub fn epoch_key(
        &mut self,
        peer: &PublicKey,
        tier: &str,
        epoch: &str,
    ) -> Result<EpochKey, SessionError> {
        let cache_key = (*peer, tier.to_string(), epoch.to_string());
        if let Some(key) = self.epoch_keys.get(&cache_key) {
            return Ok(key.clone());
        }

        let shared = self.shared_secret(peer)?.clone();
        let key = EpochKey::derive(&shared, tier, epoch)?;
        self.epoch_keys.insert(cache_key, key.clone());
        Ok(key)
    }

    /// Seal a post for a (tier, epoch) window keyed to a peer identity.
    pub fn seal_post(
        &mut self,
        peer: &PublicKey,
        tier: &str,
        epoch: &str,
        content: &[u8],
    ) -> Result<EncryptedPost, SessionError> {
        let key = self.epoch_key(peer, tier, epoch)?;
        Ok(EncryptedPost::seal(content, &key)?)
    }

    /// Open a post using its own tier/epoch fields and a peer identity.
    ///
    /// The failure mode IS the access control: without the right DH
    /// relationship this returns an authentication failure, which the
    /// application surfaces as access denied.
    pub fn open_post(
        &mut self,
        peer: &PublicKey,
        post: &EncryptedPost,
    ) -> Result<Vec<u8>, SessionError> {
        let key = self.epoch_key(peer, post.tier(), post.epoch())?;
        Ok(post.open(&key)?)
    }

    /// Re-wrap a post's content key for one recipient.
    ///
    /// Unwraps via the epoch schedule, then issues a [`Grant`] - the
    /// body is never re-encrypted.
    pub fn grant_post(
        &mut self,
        peer: &PublicKey,
        post: &EncryptedPost,
        recipient: &PublicKey,
    ) -> Result<Grant, SessionError> {
        let key = self.epoch_key(peer, post.tier(), post.epoch())?;
        let content_key = post.unwrap_content_key(&key)?;
        tracing::debug!(recipient = %recipient.to_hex(), "issuing grant");
        Ok(Grant::new(&content_key, recipient, &self.secret)?)
    }

    /// Open a post through a grant instead of the epoch schedule.
    pub fn open_granted(
        &self,
        source: &PublicKey,
        post: &EncryptedPost,
        grant: &Grant,
    ) -> Result<Vec<u8>, SessionError> {
        let content_key = grant.recover(source, &self.secret)?;
        Ok(post.open_with_content_key(&content_key)?)
    }

    /// Drop all cached key material.
    ///
    /// The cached secrets zeroize as they drop. The identity key itself
    /// lives until the session value is dropped; it cannot be handed
    /// out, so clearing the caches is the whole logout story.
    pub fn logout(&mut self) {
        let (secrets, keys) = (self.shared.len(), self.epoch_keys.len());
        self.shared.clear();
        self.epoch_keys.clear();
        tracing::debug!(account = %self.account_id, secrets, keys, "crypto session cleared");
    }
}
