use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::ops;

#[derive(Debug, Parser)]
#[command(name = "argus", about = "Zero-storage source encryption tooling", version)]
pub struct Args {
    /// Path to the config file (defaults to the platform config dir)
    #[arg(long, global = true)]
    pub config_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the canonical message a wallet must sign for key derivation
    Message(ops::Message),
    /// Derive the public key from an account's wallet signature
    Keygen(ops::Keygen),
    /// Seal a post into a JSON bundle for the content store
    Encrypt(ops::Encrypt),
    /// Open a JSON bundle sealed for one of your windows
    Decrypt(ops::Decrypt),
    /// Re-wrap a post's content key for a single recipient
    Grant(ops::GrantPost),
    /// Open a JSON bundle through a grant
    OpenGrant(ops::OpenGrant),
    /// Print the current epoch id (calendar month, UTC)
    Epoch(ops::Epoch),
}
