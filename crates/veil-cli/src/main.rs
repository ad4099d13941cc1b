//! # veil CLI Entry Point
//!
//! Assembles subcommands and dispatches to handler modules.

use clap::Parser;

/// Veil stack CLI — commit-reveal coordination tooling.
///
/// Computes commitment digests and runs scripted rounds against the
/// in-memory engine.
#[derive(Parser, Debug)]
#[command(name = "veil", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Compute a commitment digest from a value and a secret.
    Digest(veil_cli::digest::DigestArgs),
    /// Run a scripted sealed-bid commit-reveal round.
    Demo(veil_cli::demo::DemoArgs),
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Digest(args) => veil_cli::digest::run(args),
        Commands::Demo(args) => veil_cli::demo::run(args),
    }
}
