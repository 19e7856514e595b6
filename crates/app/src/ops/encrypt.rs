use std::path::PathBuf;

use crypto::identity::{KeyError, PublicKey};
use crypto::session::{CryptoSession, SessionError};

use super::current_epoch;

#[derive(Debug, thiserror::Error)]
pub enum EncryptError {
    #[error("no account id given and none in config")]
    MissingAccount,
    #[error("no tier given and none in config")]
    MissingTier,
    #[error("signature is not valid hex")]
    SignatureHex,
    #[error("key error: {0}")]
    Key(#[from] KeyError),
    #[error("session error: {0}")]
    Session(#[from] SessionError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("bundle encode error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Seal a post into a JSON bundle for the content store.
#[derive(Debug, clap::Args)]
pub struct Encrypt {
    /// Account id (falls back to the config)
    #[arg(long)]
    pub account: Option<String>,
    /// Hex-encoded wallet signature over the canonical message
    #[arg(long)]
    pub signature: String,
    /// Peer identity the epoch schedule is keyed to (hex public key)
    #[arg(long)]
    pub peer: String,
    /// Access tier (falls back to the config)
    #[arg(long)]
    pub tier: Option<String>,
    /// Epoch id (defaults to the current calendar month)
    #[arg(long)]
    pub epoch: Option<String>,
    /// File holding the post body
    #[arg(long)]
    pub input: PathBuf,
    /// Where to write the JSON bundle
    #[arg(long)]
    pub output: PathBuf,
}

impl crate::op::Op for Encrypt {
    type Error = EncryptError;
    type Output = String;

    fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let account = ctx
            .account(self.account.as_deref())
            .ok_or(EncryptError::MissingAccount)?;
        let tier = self
            .tier
            .as_deref()
            .or(ctx.config.default_tier.as_deref())
            .ok_or(EncryptError::MissingTier)?;
        let epoch = match &self.epoch {
            Some(epoch) => epoch.clone(),
            None => current_epoch(),
        };

        let signature = hex::decode(&self.signature).map_err(|_| EncryptError::SignatureHex)?;
        let peer = PublicKey::from_hex(&self.peer)?;

        let mut session = CryptoSession::login(account, &signature)?;
        let content = std::fs::read(&self.input)?;
        let post = session.seal_post(&peer, tier, &epoch, &content)?;

        std::fs::write(&self.output, serde_json::to_vec_pretty(&post)?)?;

        Ok(format!(
            "Sealed {} for {}/{}. Bundle: {} (content hash {})",
            self.input.display(),
            tier,
            epoch,
            self.output.display(),
            hex::encode(post.content_hash()),
        ))
    }
}
