//! Domain types for the voicewatch pipeline.
//!
//! The pipeline keeps no durable job state of its own: a file's location in
//! the watch/processing/archive/failed directory tree *is* its state. The
//! types here are the transient values that flow between stages.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;

/// A newly observed audio file waiting to be processed.
///
/// Created when a filesystem event or the startup scan sees an eligible file.
/// Immutable once created; consumed exactly once by the pipeline.
#[derive(Debug, Clone)]
pub struct AudioJob {
    /// Where the file was observed (inside the watch folder).
    pub source_path: PathBuf,

    /// When the file was first seen.
    pub detected_at: DateTime<Utc>,

    /// Lowercased extension without the leading dot (e.g. "m4a").
    pub extension: String,
}

impl AudioJob {
    pub fn new(source_path: PathBuf, detected_at: DateTime<Utc>) -> Self {
        let extension = source_path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        Self {
            source_path,
            detected_at,
            extension,
        }
    }

    /// File name component of the source path.
    pub fn file_name(&self) -> String {
        self.source_path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string()
    }
}

/// Check whether a path's extension belongs to the configured allow-set.
///
/// Allow-set entries may be written with or without a leading dot
/// (".m4a" or "m4a"); matching is case-insensitive. Paths without an
/// extension never match.
pub fn is_eligible(path: &Path, allowed: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| {
            allowed
                .iter()
                .any(|a| a.trim_start_matches('.').eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

/// The text produced by the external transcription command for one job.
///
/// Transient: exists only for the duration of one job's processing and is
/// never persisted independently of the generated note.
#[derive(Debug, Clone)]
pub struct Transcript {
    pub text: String,

    /// Wall-clock time the external command took.
    pub elapsed: Duration,
}

/// A composed note, ready to be written exactly once.
#[derive(Debug, Clone)]
pub struct Note {
    pub path: PathBuf,
    pub content: String,
}

/// What kind of event a notification describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Startup,
    Success,
    Failure,
}

/// A structured event handed to the notification collaborator.
///
/// The pipeline functions identically whether or not anything renders these.
#[derive(Debug, Clone)]
pub struct NotificationEvent {
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,

    /// How long the rendered notification should stay visible.
    pub duration: Duration,
}

/// Errors a job can hit on its way through the pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The move from intake to processing failed. The file stays in intake;
    /// nothing was staged, so there is nothing to roll back.
    #[error("failed to stage {file}: {source}")]
    Stage {
        file: String,
        #[source]
        source: std::io::Error,
    },

    /// The transcription command exited non-zero.
    #[error("transcription command exited with code {code}: {stderr}")]
    ExternalTool { code: i32, stderr: String },

    /// The transcription command exceeded its wall-clock budget and was killed.
    #[error("transcription timed out after {limit_secs}s")]
    Timeout { limit_secs: u64 },

    /// The command exited zero but the expected output file was not there.
    #[error("transcription output not found: {path}")]
    MissingArtifact { path: PathBuf },

    /// Writing the note failed (disk full, permissions, ...).
    #[error("failed to write note {path}: {source}")]
    NoteWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_extension_is_lowercased() {
        let job = AudioJob::new(PathBuf::from("/watch/Memo.M4A"), Utc::now());
        assert_eq!(job.extension, "m4a");
        assert_eq!(job.file_name(), "Memo.M4A");
    }

    #[test]
    fn job_without_extension() {
        let job = AudioJob::new(PathBuf::from("/watch/noext"), Utc::now());
        assert_eq!(job.extension, "");
    }

    #[test]
    fn eligibility_is_case_insensitive() {
        let allowed = vec![".m4a".to_string(), ".wav".to_string()];

        assert!(is_eligible(Path::new("/w/a.m4a"), &allowed));
        assert!(is_eligible(Path::new("/w/a.M4A"), &allowed));
        assert!(is_eligible(Path::new("/w/b.WAV"), &allowed));
        assert!(!is_eligible(Path::new("/w/c.txt"), &allowed));
        assert!(!is_eligible(Path::new("/w/noext"), &allowed));
    }

    #[test]
    fn eligibility_accepts_dotless_allow_entries() {
        let allowed = vec!["mp3".to_string()];
        assert!(is_eligible(Path::new("/w/a.mp3"), &allowed));
        assert!(!is_eligible(Path::new("/w/a.mp4"), &allowed));
    }
}
