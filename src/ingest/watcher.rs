//! Watch-folder event source.
//!
//! Emits an [`AudioJob`] for every eligible file that appears in the watch
//! folder, whether created in place or moved in. A startup scan covers files
//! that arrived while the service was down.

use std::path::PathBuf;
use std::time::Duration;

use chrono::Utc;
use notify::RecursiveMode;
use notify_debouncer_mini::new_debouncer;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::domain::{is_eligible, AudioJob};

#[derive(Debug, Error)]
pub enum WatcherError {
    #[error("Watch directory does not exist: {0}")]
    DirectoryNotFound(PathBuf),

    #[error("Notify error: {0}")]
    Notify(#[from] notify::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub struct FolderWatcher {
    watch_path: PathBuf,
    extensions: Vec<String>,
}

impl FolderWatcher {
    pub fn new(watch_path: PathBuf, extensions: Vec<String>) -> Self {
        Self {
            watch_path,
            extensions,
        }
    }

    fn validate(&self) -> Result<(), WatcherError> {
        if !self.watch_path.exists() {
            return Err(WatcherError::DirectoryNotFound(self.watch_path.clone()));
        }
        Ok(())
    }

    /// Enumerate pre-existing eligible files, in directory-listing order.
    pub async fn scan(&self) -> Result<Vec<AudioJob>, WatcherError> {
        self.validate()?;

        let mut jobs = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.watch_path).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();

            if !is_eligible(&path, &self.extensions) {
                continue;
            }

            let metadata = match entry.metadata().await {
                Ok(m) => m,
                Err(_) => continue,
            };
            if !metadata.is_file() {
                continue;
            }

            jobs.push(AudioJob::new(path, Utc::now()));
        }

        Ok(jobs)
    }

    /// Watch for new files. Jobs are emitted on the returned channel until
    /// the handle is stopped or the receiver is dropped.
    pub fn watch(&self) -> Result<(mpsc::Receiver<AudioJob>, WatchHandle), WatcherError> {
        self.validate()?;

        let (event_tx, event_rx) = mpsc::channel::<AudioJob>(100);
        let (stop_tx, stop_rx) = mpsc::channel::<()>(1);

        let watch_path = self.watch_path.clone();
        let extensions = self.extensions.clone();

        // The debounced notify loop blocks on a std channel; keep it off the
        // async worker threads.
        let task = tokio::task::spawn_blocking(move || {
            if let Err(e) = run_watcher(watch_path, extensions, event_tx, stop_rx) {
                tracing::error!("Watcher error: {}", e);
            }
        });

        Ok((
            event_rx,
            WatchHandle {
                stop_tx,
                task,
            },
        ))
    }
}

/// Handle to stop the watcher task.
pub struct WatchHandle {
    stop_tx: mpsc::Sender<()>,
    task: tokio::task::JoinHandle<()>,
}

impl WatchHandle {
    pub async fn stop(self) -> Result<(), tokio::task::JoinError> {
        let _ = self.stop_tx.send(()).await;
        self.task.await
    }
}

/// Internal watcher loop: debounced notify events → eligibility filter →
/// job channel.
fn run_watcher(
    watch_path: PathBuf,
    extensions: Vec<String>,
    event_tx: mpsc::Sender<AudioJob>,
    mut stop_rx: mpsc::Receiver<()>,
) -> Result<(), WatcherError> {
    let (tx, rx) = std::sync::mpsc::channel();

    let mut debouncer = new_debouncer(Duration::from_secs(1), tx)?;
    debouncer
        .watcher()
        .watch(&watch_path, RecursiveMode::NonRecursive)?;

    tracing::info!("Watching {} for audio files", watch_path.display());

    loop {
        if stop_rx.try_recv().is_ok() {
            tracing::info!("Watcher stopping...");
            break;
        }

        match rx.recv_timeout(Duration::from_millis(500)) {
            Ok(Ok(events)) => {
                for event in events {
                    let path = event.path;

                    if !is_eligible(&path, &extensions) {
                        continue;
                    }

                    // Directories and already-gone paths are ignored; the
                    // settle delay downstream handles in-progress writes.
                    let is_file = std::fs::metadata(&path)
                        .map(|m| m.is_file())
                        .unwrap_or(false);
                    if !is_file {
                        continue;
                    }

                    let job = AudioJob::new(path, Utc::now());
                    tracing::info!("New audio file detected: {}", job.file_name());

                    if event_tx.blocking_send(job).is_err() {
                        // Receiver gone; the service is shutting down.
                        return Ok(());
                    }
                }
            }
            Ok(Err(e)) => {
                tracing::warn!("Watch error: {:?}", e);
            }
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => {}
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => {
                tracing::error!("Watcher channel disconnected");
                break;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn extensions() -> Vec<String> {
        vec![".m4a".to_string(), ".wav".to_string()]
    }

    #[tokio::test]
    async fn scan_finds_only_eligible_files() {
        let temp = TempDir::new().unwrap();

        tokio::fs::write(temp.path().join("one.m4a"), b"a").await.unwrap();
        tokio::fs::write(temp.path().join("two.WAV"), b"b").await.unwrap();
        tokio::fs::write(temp.path().join("notes.txt"), b"c").await.unwrap();
        tokio::fs::create_dir(temp.path().join("sub.m4a")).await.unwrap();

        let watcher = FolderWatcher::new(temp.path().to_path_buf(), extensions());
        let jobs = watcher.scan().await.unwrap();

        let mut names: Vec<String> = jobs.iter().map(|j| j.file_name()).collect();
        names.sort();
        assert_eq!(names, vec!["one.m4a", "two.WAV"]);
    }

    #[tokio::test]
    async fn scan_of_empty_directory_is_empty() {
        let temp = TempDir::new().unwrap();
        let watcher = FolderWatcher::new(temp.path().to_path_buf(), extensions());

        assert!(watcher.scan().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn scan_of_missing_directory_fails() {
        let watcher = FolderWatcher::new(PathBuf::from("/nonexistent/watch"), extensions());

        let err = watcher.scan().await.unwrap_err();
        assert!(matches!(err, WatcherError::DirectoryNotFound(_)));
    }
}
