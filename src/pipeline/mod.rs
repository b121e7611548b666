//! The per-job processing pipeline.
//!
//! stage → translate → transcribe → compose → archive, with every post-stage
//! failure routed to the failed directory so no job is silently lost. Each
//! stage is a function of its inputs plus filesystem side effects; nothing
//! here depends on in-memory state from a previous run.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Local};

use crate::adapters::{to_wsl_path, Notifications, WhisperRunner};
use crate::config::Config;
use crate::domain::{AudioJob, PipelineError};

pub mod note;
pub mod stager;

pub use note::NoteComposer;
pub use stager::FileStager;

/// How one job ended. Every outcome is terminal.
#[derive(Debug)]
pub enum JobOutcome {
    /// Transcribed; audio archived; note written at the given path.
    Archived {
        note_path: PathBuf,
        elapsed: Duration,
    },

    /// The file disappeared during the settle delay. Dropped without error;
    /// a transient temp file and an externally deleted file look the same.
    Vanished,

    /// The move into processing failed; the file stays in intake.
    LeftInIntake { error: PipelineError },

    /// A post-stage failure; the file was routed to the failed directory.
    Failed { error: PipelineError },
}

pub struct Pipeline {
    stager: FileStager,
    runner: WhisperRunner,
    composer: NoteComposer,
    notifications: Notifications,
    scratch_dir: PathBuf,
    settle_delay: Duration,
    model: String,
}

impl Pipeline {
    pub fn new(config: &Config) -> Self {
        Self {
            stager: FileStager::new(&config.paths),
            runner: WhisperRunner::new(config.whisper.clone()),
            composer: NoteComposer::new(
                config.paths.output_folder.clone(),
                config.processing.organize_by_date,
                config.whisper.model.clone(),
                config.output.clone(),
            ),
            notifications: Notifications::from_config(config.notifications.clone()),
            scratch_dir: config.scratch_dir(),
            settle_delay: config.processing.settle_delay(),
            model: config.whisper.model.clone(),
        }
    }

    pub fn stager(&self) -> &FileStager {
        &self.stager
    }

    pub fn notifications(&self) -> &Notifications {
        &self.notifications
    }

    /// Drive one job through the pipeline. The caller only logs the outcome;
    /// all routing and notification happens here.
    pub async fn process(&self, job: AudioJob) -> JobOutcome {
        // Settle delay: tolerate writers that create-then-stream-write.
        tokio::time::sleep(self.settle_delay).await;

        if !tokio::fs::try_exists(&job.source_path)
            .await
            .unwrap_or(false)
        {
            tracing::debug!("File vanished before settling, dropped: {}", job.file_name());
            return JobOutcome::Vanished;
        }

        let file_name = job.file_name();

        let staged = match self.stager.stage_for_processing(&job.source_path).await {
            Ok(path) => path,
            Err(error) => {
                tracing::error!("Failed to move {} to processing: {}", file_name, error);
                return JobOutcome::LeftInIntake { error };
            }
        };
        tracing::info!("Moved to processing: {}", file_name);

        let started = std::time::Instant::now();
        match self.transcribe_staged(&staged, &job).await {
            Ok((note_path, elapsed)) => {
                self.notifications.success(&file_name, elapsed).await;
                JobOutcome::Archived { note_path, elapsed }
            }
            Err(error) => {
                tracing::error!(
                    "Transcription failed for {} after {:.1}s: {}",
                    file_name,
                    started.elapsed().as_secs_f64(),
                    error
                );

                // Best effort: no job may be silently lost once staged.
                if let Err(move_err) = self.stager.move_to_failed(&staged).await {
                    tracing::error!("Could not move {} to failed: {}", file_name, move_err);
                }

                self.notifications
                    .failure(&file_name, &error.to_string())
                    .await;
                JobOutcome::Failed { error }
            }
        }
    }

    /// Everything after staging. Any error here routes the staged file to
    /// the failed directory (in `process`).
    async fn transcribe_staged(
        &self,
        staged: &Path,
        job: &AudioJob,
    ) -> Result<(PathBuf, Duration), PipelineError> {
        let observed = observed_time(staged, job);

        let input = to_wsl_path(staged);
        let output_dir = to_wsl_path(&self.scratch_dir);
        let stem = staged
            .file_stem()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();

        tracing::info!(
            "Starting transcription: {} (model: {})",
            job.file_name(),
            self.model
        );

        let transcript = self
            .runner
            .run(&input, &output_dir, &self.scratch_dir, &stem)
            .await?;

        tracing::info!(
            "Transcription complete in {:.1}s",
            transcript.elapsed.as_secs_f64()
        );

        let note = self.composer.compose(
            &transcript.text,
            &job.file_name(),
            observed,
            transcript.elapsed,
        )?;
        self.composer.write(&note).await?;
        tracing::info!("Created note: {}", note.path.display());

        self.stager.archive(staged).await?;
        tracing::info!("Archived: {}", job.file_name());

        Ok((note.path, transcript.elapsed))
    }
}

/// The note's observed time: the staged file's mtime (the recording's own
/// timestamp survives the move), falling back to when the job was detected.
fn observed_time(staged: &Path, job: &AudioJob) -> DateTime<Local> {
    std::fs::metadata(staged)
        .and_then(|m| m.modified())
        .map(DateTime::<Local>::from)
        .unwrap_or_else(|_| job.detected_at.with_timezone(&Local))
}
