use std::path::PathBuf;

use crypto::identity::{KeyError, PublicKey};
use crypto::post::EncryptedPost;
use crypto::session::{CryptoSession, SessionError};

#[derive(Debug, thiserror::Error)]
pub enum DecryptError {
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

/// Open a JSON bundle. The tier and epoch come from the bundle itself;
/// a bundle sealed outside your windows fails authentication, which is
/// the access control working as intended.
#[derive(Debug, clap::Args)]
pub struct Decrypt {
    /// Account id (falls back to the config)
    #[arg(long)]
    pub account: Option<String>,
    /// Hex-encoded wallet signature over the canonical message
    #[arg(long)]
    pub signature: String,
    /// Peer identity the epoch schedule is keyed to (hex public key)
    #[arg(long)]
    pub peer: String,
    /// JSON bundle to open
    #[arg(long)]
    pub input: PathBuf,
    /// Where to write the plaintext (prints to stdout when omitted)
    #[arg(long)]
    pub output: Option<PathBuf>,
}

impl crate::op::Op for Decrypt {
    type Error = DecryptError;
    type Output = String;

    fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let account = ctx
            .account(self.account.as_deref())
            .ok_or(DecryptError::MissingAccount)?;
        let signature = hex::decode(&self.signature).map_err(|_| DecryptError::SignatureHex)?;
        let peer = PublicKey::from_hex(&self.peer)?;

        let post: EncryptedPost = serde_json::from_slice(&std::fs::read(&self.input)?)?;

        let mut session = CryptoSession::login(account, &signature)?;
        let plaintext = session.open_post(&peer, &post)?;

        match &self.output {
            Some(path) => {
                std::fs::write(path, &plaintext)?;
                Ok(format!(
                    "Opened {} ({}/{}) -> {}",
                    self.input.display(),
                    post.tier(),
                    post.epoch(),
                    path.display(),
                ))
            }
            None => Ok(String::from_utf8_lossy(&plaintext).into_owned()),
        }
    }
}
