//! Command-line interface for voicewatch.
//!
//! - `voicewatch watch` — run the watcher service
//! - `voicewatch run <file>` — push one audio file through the pipeline
//! - `voicewatch config` — show the resolved configuration

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::Config;

mod watch;

/// voicewatch - folder-watching voice transcription service
#[derive(Parser, Debug)]
#[command(name = "voicewatch")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Watch the intake folder and transcribe arriving audio files
    Watch {
        /// Config file path
        #[arg(short, long, env = "VOICEWATCH_CONFIG")]
        config: Option<PathBuf>,

        /// Process the current backlog once and exit without watching
        #[arg(long)]
        once: bool,
    },

    /// Push a single audio file through the pipeline
    Run {
        /// Audio file to transcribe (will be moved through the pipeline)
        file: PathBuf,

        /// Config file path
        #[arg(short, long, env = "VOICEWATCH_CONFIG")]
        config: Option<PathBuf>,
    },

    /// Show the resolved configuration
    Config {
        /// Config file path
        #[arg(short, long, env = "VOICEWATCH_CONFIG")]
        config: Option<PathBuf>,
    },
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Watch { config, once } => watch::execute(config.as_deref(), once).await,
            Commands::Run { file, config } => watch::execute_run(file, config.as_deref()).await,
            Commands::Config { config } => show_config(config.as_deref()),
        }
    }
}

/// Print the resolved configuration
fn show_config(config_path: Option<&Path>) -> Result<()> {
    let config = Config::load(config_path)?;

    println!();
    println!("voicewatch configuration");
    println!("══════════════════════════════════════════════════════════════");
    println!();
    println!("Paths:");
    println!("  Watch:      {}", config.paths.watch_folder.display());
    println!("  Processing: {}", config.paths.processing_folder.display());
    println!("  Archive:    {}", config.paths.archive_folder.display());
    println!("  Failed:     {}", config.paths.failed_folder.display());
    println!("  Output:     {}", config.paths.output_folder.display());
    println!("  Scratch:    {}", config.scratch_dir().display());
    println!();
    println!("Whisper:");
    println!("  Launcher:   {:?}", config.whisper.shell);
    println!("  Binary:     {}", config.whisper.binary);
    if let Some(venv) = &config.whisper.venv_path {
        println!("  Venv:       {}", venv);
    }
    println!("  Model:      {}", config.whisper.model);
    println!("  Language:   {}", config.whisper.language);
    println!("  Format:     {}", config.whisper.output_format);
    println!("  Timeout:    {}s", config.whisper.command_timeout_seconds);
    println!();
    println!("Processing:");
    println!("  Formats:     {:?}", config.processing.supported_formats);
    println!("  Settle wait: {}s", config.processing.file_write_wait_seconds);
    println!("  By date:     {}", config.processing.organize_by_date);
    println!();
    println!("Notifications:");
    println!("  Enabled:    {}", config.notifications.enabled);
    println!("  On success: {}", config.notifications.on_success);
    println!("  On failure: {}", config.notifications.on_failure);
    println!();
    println!("Logging:");
    match &config.logging.file {
        Some(file) => println!("  File:       {}", file.display()),
        None => println!("  File:       (console only)"),
    }
    println!("  Level:      {}", config.logging.level);

    Ok(())
}
