//! Markdown note generation.
//!
//! Deterministic target naming and a fixed document layout: YAML-style
//! frontmatter, a dated header line, the transcription body, and a footer.
//! The same instant renders through three independently configured formats
//! (frontmatter, header, filename); that is intentional.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Local};
use tokio::io::AsyncWriteExt;

use crate::config::OutputConfig;
use crate::domain::{Note, PipelineError};

pub struct NoteComposer {
    output_root: PathBuf,
    organize_by_date: bool,
    model: String,
    config: OutputConfig,
}

impl NoteComposer {
    pub fn new(
        output_root: PathBuf,
        organize_by_date: bool,
        model: impl Into<String>,
        config: OutputConfig,
    ) -> Self {
        Self {
            output_root,
            organize_by_date,
            model: model.into(),
            config,
        }
    }

    /// Produce the note for one transcription: resolve the target folder
    /// (created on demand), pick the first unused filename, and render the
    /// document. Pure apart from directory creation and existence checks.
    pub fn compose(
        &self,
        transcription: &str,
        source_file: &str,
        observed: DateTime<Local>,
        duration: Duration,
    ) -> Result<Note, PipelineError> {
        let target_dir = if self.organize_by_date {
            self.output_root
                .join(
                    observed
                        .format(&self.config.date_organization.year_format)
                        .to_string(),
                )
                .join(
                    observed
                        .format(&self.config.date_organization.month_format)
                        .to_string(),
                )
        } else {
            self.output_root.clone()
        };

        std::fs::create_dir_all(&target_dir).map_err(|e| PipelineError::NoteWrite {
            path: target_dir.clone(),
            source: e,
        })?;

        let timestamp = observed
            .format(&self.config.filename_timestamp_format)
            .to_string();

        // Duplicate avoidance: strictly increasing counter, no upper bound;
        // the loop ends only on a free name.
        let mut counter = 0u32;
        let path = loop {
            let candidate = target_dir.join(self.candidate_name(&timestamp, counter));
            if !candidate.exists() {
                break candidate;
            }
            counter += 1;
        };

        let content = self.render(transcription, source_file, observed, duration);

        Ok(Note { path, content })
    }

    /// Write the note exactly once. An existing file at the target path is a
    /// write error, never overwritten.
    pub async fn write(&self, note: &Note) -> Result<(), PipelineError> {
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&note.path)
            .await
            .map_err(|e| PipelineError::NoteWrite {
                path: note.path.clone(),
                source: e,
            })?;

        file.write_all(note.content.as_bytes())
            .await
            .map_err(|e| PipelineError::NoteWrite {
                path: note.path.clone(),
                source: e,
            })?;

        Ok(())
    }

    fn candidate_name(&self, timestamp: &str, counter: u32) -> String {
        if counter == 0 {
            format!(
                "{}{}{}",
                timestamp, self.config.filename_prefix, self.config.filename_extension
            )
        } else {
            let suffix = self
                .config
                .duplicate_counter_format
                .replace("{counter}", &counter.to_string());
            format!("{}{}{}", timestamp, suffix, self.config.filename_extension)
        }
    }

    fn render(
        &self,
        transcription: &str,
        source_file: &str,
        observed: DateTime<Local>,
        duration: Duration,
    ) -> String {
        let created = observed
            .format(&self.config.frontmatter_datetime_format)
            .to_string();
        let header_time = observed
            .format(&self.config.header_datetime_format)
            .to_string();
        let tags = self.config.default_tags.join(", ");

        format!(
            "---\n\
             created: {created}\n\
             source: {source_file}\n\
             processing_time: {secs:.1}s\n\
             model: whisper-{model}\n\
             tags: [{tags}]\n\
             command_type: {command_type}\n\
             ---\n\
             \n\
             {header_prefix}{header_time}\n\
             \n\
             {transcription}\n\
             \n\
             ---\n\
             {footer}\n",
            created = created,
            source_file = source_file,
            secs = duration.as_secs_f64(),
            model = self.model,
            tags = tags,
            command_type = self.config.command_type,
            header_prefix = self.config.header_prefix,
            header_time = header_time,
            transcription = transcription,
            footer = self.config.footer_text,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn observed() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 1, 9, 14, 30, 5).unwrap()
    }

    fn composer(temp: &TempDir, organize_by_date: bool) -> NoteComposer {
        NoteComposer::new(
            temp.path().join("output"),
            organize_by_date,
            "medium",
            OutputConfig::default(),
        )
    }

    #[tokio::test]
    async fn flat_output_uses_root_and_timestamp_name() {
        let temp = TempDir::new().unwrap();
        let composer = composer(&temp, false);

        let note = composer
            .compose("hello", "memo.m4a", observed(), Duration::from_secs(12))
            .unwrap();

        assert_eq!(
            note.path,
            temp.path().join("output/2026-01-09_14-30-05_voice_note.md")
        );
    }

    #[tokio::test]
    async fn date_organization_builds_year_month_tree() {
        let temp = TempDir::new().unwrap();
        let composer = composer(&temp, true);

        let note = composer
            .compose("hello", "memo.m4a", observed(), Duration::from_secs(12))
            .unwrap();

        assert_eq!(
            note.path,
            temp.path()
                .join("output/2026/01/2026-01-09_14-30-05_voice_note.md")
        );
        assert!(temp.path().join("output/2026/01").is_dir());
    }

    #[tokio::test]
    async fn collisions_get_strictly_increasing_suffixes() {
        let temp = TempDir::new().unwrap();
        let composer = composer(&temp, false);

        let first = composer
            .compose("first", "a.m4a", observed(), Duration::from_secs(1))
            .unwrap();
        composer.write(&first).await.unwrap();

        let second = composer
            .compose("second", "b.m4a", observed(), Duration::from_secs(1))
            .unwrap();
        composer.write(&second).await.unwrap();

        let third = composer
            .compose("third", "c.m4a", observed(), Duration::from_secs(1))
            .unwrap();
        composer.write(&third).await.unwrap();

        assert!(first.path.ends_with("2026-01-09_14-30-05_voice_note.md"));
        assert!(second.path.ends_with("2026-01-09_14-30-05_voice_note_1.md"));
        assert!(third.path.ends_with("2026-01-09_14-30-05_voice_note_2.md"));

        // The first note survived both collisions untouched.
        let content = tokio::fs::read_to_string(&first.path).await.unwrap();
        assert!(content.contains("first"));
    }

    #[tokio::test]
    async fn write_never_overwrites() {
        let temp = TempDir::new().unwrap();
        let composer = composer(&temp, false);

        let note = composer
            .compose("text", "a.m4a", observed(), Duration::from_secs(1))
            .unwrap();
        composer.write(&note).await.unwrap();

        // Forcing a second write to the same path must fail, not clobber.
        let err = composer.write(&note).await.unwrap_err();
        assert!(matches!(err, PipelineError::NoteWrite { .. }));
    }

    #[tokio::test]
    async fn document_layout_matches_the_template() {
        let temp = TempDir::new().unwrap();
        let composer = composer(&temp, false);

        let note = composer
            .compose(
                "the spoken words",
                "memo.m4a",
                observed(),
                Duration::from_millis(12_340),
            )
            .unwrap();

        let lines: Vec<&str> = note.content.lines().collect();
        assert_eq!(lines[0], "---");
        assert_eq!(lines[1], "created: 2026-01-09 14:30:05");
        assert_eq!(lines[2], "source: memo.m4a");
        assert_eq!(lines[3], "processing_time: 12.3s");
        assert_eq!(lines[4], "model: whisper-medium");
        assert_eq!(lines[5], "tags: [voice-note, transcription]");
        assert_eq!(lines[6], "command_type: voice-note");
        assert_eq!(lines[7], "---");
        assert_eq!(lines[8], "");
        assert_eq!(lines[9], "# Voice Note 2026-01-09 14:30");
        assert_eq!(lines[10], "");
        assert_eq!(lines[11], "the spoken words");
        assert_eq!(lines[12], "");
        assert_eq!(lines[13], "---");
        assert_eq!(lines[14], "*Transcribed automatically*");
        assert!(note.content.ends_with('\n'));
    }

    #[tokio::test]
    async fn filename_header_and_frontmatter_render_independently() {
        let temp = TempDir::new().unwrap();
        let composer = composer(&temp, false);

        let note = composer
            .compose("t", "a.m4a", observed(), Duration::from_secs(1))
            .unwrap();

        // One instant, three renderings.
        assert!(note.path.to_string_lossy().contains("2026-01-09_14-30-05"));
        assert!(note.content.contains("created: 2026-01-09 14:30:05"));
        assert!(note.content.contains("# Voice Note 2026-01-09 14:30\n"));
    }
}
