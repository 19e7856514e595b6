use crypto::identity::key_derivation_message;

#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    #[error("no account id given and none in config")]
    MissingAccount,
}

/// Print the canonical wallet-signing message for an account.
///
/// The wallet signs exactly this string; the signature then feeds
/// `keygen`, `encrypt`, and the rest. The message carries no timestamp,
/// so the wallet returns the same signature on every login.
#[derive(Debug, clap::Args)]
pub struct Message {
    /// Account id (falls back to the config)
    #[arg(long)]
    pub account: Option<String>,
}

impl crate::op::Op for Message {
    type Error = MessageError;
    type Output = String;

    fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let account = ctx
            .account(self.account.as_deref())
            .ok_or(MessageError::MissingAccount)?;
        Ok(key_derivation_message(account))
    }
}
