use crypto::identity::{KeyError, SecretKey};

#[derive(Debug, thiserror::Error)]
pub enum KeygenError {
    #[error("no account id given and none in config")]
    MissingAccount,
    #[error("signature is not valid hex")]
    SignatureHex,
    #[error("key error: {0}")]
    Key(#[from] KeyError),
}

/// Derive the feed keypair from a wallet signature and print the public
/// key. Nothing is written to disk; rerun with the same signature to get
/// the same key.
#[derive(Debug, clap::Args)]
pub struct Keygen {
    /// Account id (falls back to the config)
    #[arg(long)]
    pub account: Option<String>,
    /// Hex-encoded wallet signature over the canonical message
    #[arg(long)]
    pub signature: String,
}

impl crate::op::Op for Keygen {
    type Error = KeygenError;
    type Output = String;

    fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let account = ctx
            .account(self.account.as_deref())
            .ok_or(KeygenError::MissingAccount)?;
        let signature = hex::decode(&self.signature).map_err(|_| KeygenError::SignatureHex)?;

        let secret = SecretKey::from_wallet_signature(account, &signature)?;
        Ok(format!("{} {}", account, secret.public().to_hex()))
    }
}
