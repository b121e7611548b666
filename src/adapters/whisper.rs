//! Whisper transcription runner.
//!
//! Shells out to the whisper CLI through a configurable launcher (WSL by
//! default), enforces a wall-clock timeout, and retrieves the text artifact
//! the command leaves in the scratch directory. The runner never retries;
//! every failure is classified and reported upward.

use std::path::Path;
use std::process::Stdio;
use std::time::Instant;

use tokio::process::Command;
use tokio::time::timeout;

use crate::config::WhisperConfig;
use crate::domain::{PipelineError, Transcript};

/// Maximum diagnostic characters carried in an error.
const DIAGNOSTIC_LIMIT: usize = 400;

pub struct WhisperRunner {
    config: WhisperConfig,
}

impl WhisperRunner {
    pub fn new(config: WhisperConfig) -> Self {
        Self { config }
    }

    /// Transcribe one staged file.
    ///
    /// `input` and `output_dir` are in the external environment's path form;
    /// `scratch_dir` is the same output directory in native form, used to
    /// create it and to read the artifact back. `stem` names the artifact
    /// (`<stem>.<output_format>`).
    pub async fn run(
        &self,
        input: &str,
        output_dir: &str,
        scratch_dir: &Path,
        stem: &str,
    ) -> Result<Transcript, PipelineError> {
        // The scratch area may not exist yet; creating it is idempotent.
        tokio::fs::create_dir_all(scratch_dir).await?;

        let (program, launcher_args) = self.config.shell.split_first().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "whisper.shell must name a launcher",
            )
        })?;

        let command_line = self.build_command_line(input, output_dir);

        // kill_on_drop: when the timeout drops the wait future, the child is
        // killed rather than left running.
        let child = Command::new(program)
            .args(launcher_args)
            .arg(&command_line)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let started = Instant::now();
        let output = match timeout(self.config.timeout(), child.wait_with_output()).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(PipelineError::Timeout {
                    limit_secs: self.config.command_timeout_seconds,
                });
            }
        };
        let elapsed = started.elapsed();

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PipelineError::ExternalTool {
                code: output.status.code().unwrap_or(-1),
                stderr: truncate_diagnostic(stderr.trim()),
            });
        }

        let artifact = scratch_dir.join(format!("{}.{}", stem, self.config.output_format));
        let text = match tokio::fs::read_to_string(&artifact).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(PipelineError::MissingArtifact { path: artifact });
            }
            Err(e) => return Err(e.into()),
        };

        // The scratch directory is not a result store.
        tokio::fs::remove_file(&artifact).await?;

        Ok(Transcript {
            text: text.trim().to_string(),
            elapsed,
        })
    }

    /// Build the single command string handed to the launcher.
    fn build_command_line(&self, input: &str, output_dir: &str) -> String {
        let mut line = String::new();

        if let Some(venv) = &self.config.venv_path {
            line.push_str(&format!("source {}/bin/activate && ", venv));
        }

        line.push_str(&format!(
            "{} '{}' --model {} --language {} --output_dir '{}' --output_format {}",
            self.config.binary,
            input,
            self.config.model,
            self.config.language,
            output_dir,
            self.config.output_format,
        ));

        line
    }
}

/// Cap diagnostic text so log lines and notifications stay readable.
fn truncate_diagnostic(text: &str) -> String {
    if text.len() <= DIAGNOSTIC_LIMIT {
        return text.to_string();
    }

    let mut end = DIAGNOSTIC_LIMIT;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}
