//! Folder-to-folder moves encoding pipeline state.
//!
//! A file's directory *is* its pipeline state: intake (watch), processing,
//! archive, failed. Transitions are single renames, never copies, so a path
//! exists in at most one state directory at a time.

use std::path::{Path, PathBuf};

use crate::config::PathsConfig;
use crate::domain::PipelineError;

pub struct FileStager {
    watch: PathBuf,
    processing: PathBuf,
    archive: PathBuf,
    failed: PathBuf,
}

impl FileStager {
    pub fn new(paths: &PathsConfig) -> Self {
        Self {
            watch: paths.watch_folder.clone(),
            processing: paths.processing_folder.clone(),
            archive: paths.archive_folder.clone(),
            failed: paths.failed_folder.clone(),
        }
    }

    /// Create the four state directories (idempotent).
    pub async fn ensure_layout(&self) -> std::io::Result<()> {
        for dir in [&self.watch, &self.processing, &self.archive, &self.failed] {
            tokio::fs::create_dir_all(dir).await?;
        }
        Ok(())
    }

    /// Move a file from intake into processing.
    ///
    /// On failure the job is abandoned where it is: nothing was staged, so
    /// there is nothing to roll back.
    pub async fn stage_for_processing(&self, source: &Path) -> Result<PathBuf, PipelineError> {
        let name = source.file_name().ok_or_else(|| PipelineError::Stage {
            file: source.display().to_string(),
            source: std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "source path has no file name",
            ),
        })?;

        let staged = self.processing.join(name);
        tokio::fs::rename(source, &staged)
            .await
            .map_err(|e| PipelineError::Stage {
                file: source.display().to_string(),
                source: e,
            })?;

        Ok(staged)
    }

    /// Move a successfully processed file from processing into the archive.
    pub async fn archive(&self, staged: &Path) -> Result<PathBuf, PipelineError> {
        let dest = self.archive.join(file_name(staged));
        tokio::fs::rename(staged, &dest).await?;
        Ok(dest)
    }

    /// Move a file that failed downstream from processing into failed.
    ///
    /// No-op when the staged file is already gone (moved or deleted by
    /// something else); a lost race here is not an error.
    pub async fn move_to_failed(&self, staged: &Path) -> Result<Option<PathBuf>, PipelineError> {
        if !tokio::fs::try_exists(staged).await.unwrap_or(false) {
            return Ok(None);
        }

        let dest = self.failed.join(file_name(staged));
        tokio::fs::rename(staged, &dest).await?;
        Ok(Some(dest))
    }
}

fn file_name(path: &Path) -> std::ffi::OsString {
    path.file_name().unwrap_or_default().to_os_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn stager_in(temp: &TempDir) -> FileStager {
        FileStager::new(&PathsConfig {
            watch_folder: temp.path().join("watch"),
            processing_folder: temp.path().join("processing"),
            archive_folder: temp.path().join("archive"),
            failed_folder: temp.path().join("failed"),
            output_folder: temp.path().join("output"),
            whisper_temp_output: "tmp".to_string(),
        })
    }

    #[tokio::test]
    async fn stage_moves_into_processing() {
        let temp = TempDir::new().unwrap();
        let stager = stager_in(&temp);
        stager.ensure_layout().await.unwrap();

        let source = temp.path().join("watch/memo.m4a");
        tokio::fs::write(&source, b"audio").await.unwrap();

        let staged = stager.stage_for_processing(&source).await.unwrap();

        assert_eq!(staged, temp.path().join("processing/memo.m4a"));
        assert!(!source.exists());
        assert!(staged.exists());
    }

    #[tokio::test]
    async fn stage_of_vanished_source_is_stage_error() {
        let temp = TempDir::new().unwrap();
        let stager = stager_in(&temp);
        stager.ensure_layout().await.unwrap();

        let err = stager
            .stage_for_processing(&temp.path().join("watch/gone.m4a"))
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::Stage { .. }));
    }

    #[tokio::test]
    async fn archive_moves_out_of_processing() {
        let temp = TempDir::new().unwrap();
        let stager = stager_in(&temp);
        stager.ensure_layout().await.unwrap();

        let staged = temp.path().join("processing/memo.m4a");
        tokio::fs::write(&staged, b"audio").await.unwrap();

        let archived = stager.archive(&staged).await.unwrap();

        assert_eq!(archived, temp.path().join("archive/memo.m4a"));
        assert!(!staged.exists());
        assert!(archived.exists());
    }

    #[tokio::test]
    async fn move_to_failed_moves_when_present() {
        let temp = TempDir::new().unwrap();
        let stager = stager_in(&temp);
        stager.ensure_layout().await.unwrap();

        let staged = temp.path().join("processing/memo.m4a");
        tokio::fs::write(&staged, b"audio").await.unwrap();

        let failed = stager.move_to_failed(&staged).await.unwrap();

        assert_eq!(failed, Some(temp.path().join("failed/memo.m4a")));
        assert!(!staged.exists());
    }

    #[tokio::test]
    async fn move_to_failed_is_noop_when_gone() {
        let temp = TempDir::new().unwrap();
        let stager = stager_in(&temp);
        stager.ensure_layout().await.unwrap();

        let result = stager
            .move_to_failed(&temp.path().join("processing/gone.m4a"))
            .await
            .unwrap();

        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn ensure_layout_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let stager = stager_in(&temp);

        stager.ensure_layout().await.unwrap();
        stager.ensure_layout().await.unwrap();

        assert!(temp.path().join("watch").is_dir());
        assert!(temp.path().join("failed").is_dir());
    }
}
