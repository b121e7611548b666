//! voicewatch - folder-watching voice transcription service
//!
//! Watches a directory for newly-arrived audio files and drives each through
//! a deterministic pipeline: staging, external whisper transcription, note
//! generation, and archival or failure routing.
//!
//! # Architecture
//!
//! The pipeline's state lives on the filesystem: a file is in exactly one of
//! the watch, processing, archive, or failed directories at any time, and
//! transitions are atomic renames. Processing is strictly sequential — one
//! job in flight, the rest waiting in a FIFO intake queue. Recovery after a
//! restart is structural: the watch folder is re-scanned at startup, so no
//! in-memory bookkeeping needs to survive the process.
//!
//! # Modules
//!
//! - `adapters`: external seams (whisper runner, WSL path translation,
//!   desktop notifications)
//! - `ingest`: folder watcher and intake queue
//! - `pipeline`: the per-job stage machine (stager, note composer)
//! - `domain`: data structures and error kinds
//! - `cli`: command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Run the watcher service
//! voicewatch watch
//!
//! # Process the backlog once and exit
//! voicewatch watch --once
//!
//! # Transcribe a single file
//! voicewatch run memo.m4a
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod domain;
pub mod ingest;
pub mod logging;
pub mod pipeline;

// Re-export main types at crate root for convenience
pub use config::Config;
pub use domain::{AudioJob, Note, NotificationEvent, NotificationKind, PipelineError, Transcript};
pub use ingest::{FolderWatcher, IntakeQueue, WatcherError};
pub use pipeline::{FileStager, JobOutcome, NoteComposer, Pipeline};
