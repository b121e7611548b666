//! The watch service run loop (composition root).
//!
//! Wires filesystem events into the intake queue, drains the queue through
//! the pipeline one job at a time, and reacts to Ctrl-C by stopping event
//! intake while letting the in-flight drain finish its current job.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;

use crate::config::Config;
use crate::domain::AudioJob;
use crate::ingest::{FolderWatcher, IntakeQueue};
use crate::logging;
use crate::pipeline::{JobOutcome, Pipeline};

/// Run the watcher service.
pub async fn execute(config_path: Option<&Path>, once: bool) -> Result<()> {
    let config = Config::load(config_path)?;
    let _log_guard = logging::init(&config.logging)?;

    let pipeline = Pipeline::new(&config);
    pipeline
        .stager()
        .ensure_layout()
        .await
        .context("Failed to create pipeline directories")?;

    tracing::info!("Watching folder: {}", config.paths.watch_folder.display());
    tracing::info!("Whisper model: {}", config.whisper.model);
    tracing::info!("Output folder: {}", config.paths.output_folder.display());
    tracing::info!(
        "Supported formats: {:?}",
        config.processing.supported_formats
    );

    let watcher = FolderWatcher::new(
        config.paths.watch_folder.clone(),
        config.processing.supported_formats.clone(),
    );
    let queue = IntakeQueue::new();

    // Backlog first: files dropped while the service was down.
    let backlog = watcher.scan().await?;
    if !backlog.is_empty() {
        tracing::info!("Found {} existing audio file(s) to process", backlog.len());
        for job in backlog {
            queue.enqueue(job);
        }
        drain(&queue, &pipeline).await;
    }

    if once {
        return Ok(());
    }

    let (mut event_rx, handle) = watcher.watch()?;
    pipeline
        .notifications()
        .startup(&config.paths.watch_folder)
        .await;
    tracing::info!("Watcher started. Press Ctrl+C to stop.");

    loop {
        tokio::select! {
            maybe_job = event_rx.recv() => {
                match maybe_job {
                    Some(job) => {
                        queue.enqueue(job);
                        drain(&queue, &pipeline).await;
                    }
                    None => {
                        tracing::error!("Watcher stopped unexpectedly");
                        break;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutting down...");
                break;
            }
        }
    }

    if handle.stop().await.is_err() {
        tracing::warn!("Watcher task did not shut down cleanly");
    }
    tracing::info!("Watcher stopped.");

    Ok(())
}

/// Push a single audio file through the pipeline and exit.
pub async fn execute_run(file: PathBuf, config_path: Option<&Path>) -> Result<()> {
    let config = Config::load(config_path)?;
    let _log_guard = logging::init(&config.logging)?;

    let pipeline = Pipeline::new(&config);
    pipeline
        .stager()
        .ensure_layout()
        .await
        .context("Failed to create pipeline directories")?;

    let job = AudioJob::new(file, Utc::now());
    match pipeline.process(job).await {
        JobOutcome::Archived { note_path, elapsed } => {
            println!(
                "Created note: {} ({:.1}s)",
                note_path.display(),
                elapsed.as_secs_f64()
            );
            Ok(())
        }
        JobOutcome::Vanished => {
            anyhow::bail!("File disappeared before it could be processed")
        }
        JobOutcome::LeftInIntake { error } => {
            anyhow::bail!("Could not stage file: {}", error)
        }
        JobOutcome::Failed { error } => {
            anyhow::bail!("Transcription failed: {}", error)
        }
    }
}

/// Drain the queue through the pipeline. The pipeline logs and notifies per
/// job; the queue guarantees a second concurrent drain is a no-op.
async fn drain(queue: &IntakeQueue, pipeline: &Pipeline) {
    queue
        .drain(|job| async move {
            let _ = pipeline.process(job).await;
        })
        .await;
}
