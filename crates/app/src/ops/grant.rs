use std::path::PathBuf;

use crypto::identity::{KeyError, PublicKey};
use crypto::post::EncryptedPost;
use crypto::session::{CryptoSession, SessionError};

#[derive(Debug, thiserror::Error)]
pub enum GrantPostError {
    #[error("no account id given and none in config")]
    MissingAccount,
    #[error("signature is not valid hex")]
    SignatureHex,
    #[error("key error: {0}")]
    Key(#[from] KeyError),
    #[error("session error: {0}")]
    Session(#[from] SessionError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("bundle decode error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Re-wrap a post's content key for a single recipient, without tier
/// membership and without re-encrypting the body. Prints the grant as
/// hex; hand it to the recipient alongside the bundle and your public
/// key.
#[derive(Debug, clap::Args)]
pub struct GrantPost {
    /// Account id (falls back to the config)
    #[arg(long)]
    pub account: Option<String>,
    /// Hex-encoded wallet signature over the canonical message
    #[arg(long)]
    pub signature: String,
    /// Peer identity the post's epoch schedule is keyed to (hex public key)
    #[arg(long)]
    pub peer: String,
    /// Recipient of the grant (hex public key)
    #[arg(long)]
    pub recipient: String,
    /// JSON bundle whose content key to re-wrap
    #[arg(long)]
    pub input: PathBuf,
}

impl crate::op::Op for GrantPost {
    type Error = GrantPostError;
    type Output = String;

    fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let account = ctx
            .account(self.account.as_deref())
            .ok_or(GrantPostError::MissingAccount)?;
        let signature = hex::decode(&self.signature).map_err(|_| GrantPostError::SignatureHex)?;
        let peer = PublicKey::from_hex(&self.peer)?;
        let recipient = PublicKey::from_hex(&self.recipient)?;

        let post: EncryptedPost = serde_json::from_slice(&std::fs::read(&self.input)?)?;

        let mut session = CryptoSession::login(account, &signature)?;
        let grant = session.grant_post(&peer, &post, &recipient)?;

        Ok(grant.to_hex())
    }
}
