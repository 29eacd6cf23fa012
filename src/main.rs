//! Labdash CLI entry point

use clap::Parser;
use labdash::cli::{self, Cli};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_env("LABDASH_LOG"))
        .init();

    let cli = Cli::parse();
    cli::run(cli).await?;
    Ok(())
}
