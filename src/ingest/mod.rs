//! Audio file intake.
//!
//! The watcher observes the watch folder (plus a startup scan for files that
//! arrived while the service was down) and feeds the intake queue; the queue
//! serializes processing into a single in-flight job.
//!
//! ```text
//! watch folder → FolderWatcher → IntakeQueue → pipeline
//! ```

pub mod queue;
pub mod watcher;

pub use queue::IntakeQueue;
pub use watcher::{FolderWatcher, WatchHandle, WatcherError};
