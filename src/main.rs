//! voicewatch CLI entrypoint

use anyhow::Result;
use clap::Parser;

use voicewatch::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    // Logging is initialized per-command once the configuration is loaded.
    let cli = Cli::parse();
    cli.execute().await
}
