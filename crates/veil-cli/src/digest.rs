//! # Digest Subcommand
//!
//! Computes the commitment digest for a `(value, secret)` pair with the
//! reference SHA-256 oracle — the digest a participant submits during the
//! commit phase and later must reproduce at reveal.

use clap::Args;

use veil_core::{HashOracle, Sha256Oracle};

/// Arguments for the digest subcommand.
#[derive(Args, Debug)]
pub struct DigestArgs {
    /// The value to commit to (e.g., a bid or a vote).
    #[arg(long)]
    pub value: String,

    /// The binding secret, disclosed only at reveal time.
    #[arg(long)]
    pub secret: String,
}

/// Compute and print the commitment digest.
pub fn run(args: DigestArgs) -> anyhow::Result<()> {
    let digest = Sha256Oracle.commitment_digest(args.value.as_bytes(), args.secret.as_bytes());
    println!("{digest}");
    Ok(())
}
