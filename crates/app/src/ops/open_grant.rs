use std::path::PathBuf;

use crypto::grant::{Grant, GrantError};
use crypto::identity::{KeyError, PublicKey};
use crypto::post::EncryptedPost;
use crypto::session::{CryptoSession, SessionError};

#[derive(Debug, thiserror::Error)]
pub enum OpenGrantError {
    #[error("no account id given and none in config")]
    MissingAccount,
    #[error("signature is not valid hex")]
    SignatureHex,
    #[error("key error: {0}")]
    Key(#[from] KeyError),
    #[error("grant error: {0}")]
    Grant(#[from] GrantError),
    #[error("session error: {0}")]
    Session(#[from] SessionError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("bundle decode error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Open a JSON bundle through a grant issued to you, bypassing the
/// epoch schedule entirely.
#[derive(Debug, clap::Args)]
pub struct OpenGrant {
    /// Account id (falls back to the config)
    #[arg(long)]
    pub account: Option<String>,
    /// Hex-encoded wallet signature over the canonical message
    #[arg(long)]
    pub signature: String,
    /// Public key of the source who issued the grant (hex)
    #[arg(long)]
    pub source: String,
    /// The grant itself (hex)
    #[arg(long)]
    pub grant: String,
    /// JSON bundle to open
    #[arg(long)]
    pub input: PathBuf,
    /// Where to write the plaintext (prints to stdout when omitted)
    #[arg(long)]
    pub output: Option<PathBuf>,
}

impl crate::op::Op for OpenGrant {
    type Error = OpenGrantError;
    type Output = String;

    fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let account = ctx
            .account(self.account.as_deref())
            .ok_or(OpenGrantError::MissingAccount)?;
        let signature = hex::decode(&self.signature).map_err(|_| OpenGrantError::SignatureHex)?;
        let source = PublicKey::from_hex(&self.source)?;
        let grant = Grant::from_hex(&self.grant)?;

        let post: EncryptedPost = serde_json::from_slice(&std::fs::read(&self.input)?)?;

        let session = CryptoSession::login(account, &signature)?;
        let plaintext = session.open_granted(&source, &post, &grant)?;

        match &self.output {
            Some(path) => {
                std::fs::write(path, &plaintext)?;
                Ok(format!("Opened {} -> {}", self.input.display(), path.display()))
            }
            None => Ok(String::from_utf8_lossy(&plaintext).into_owned()),
        }
    }
}
