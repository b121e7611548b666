//! Service configuration.
//!
//! Loaded once at startup from a YAML file and treated as immutable for the
//! process lifetime.
//!
//! Discovery order (highest priority first):
//! 1. `--config <path>` flag (or `VOICEWATCH_CONFIG`, resolved by the CLI)
//! 2. `voicewatch.yaml` in the current directory
//! 3. `~/.config/voicewatch/config.yaml`
//! 4. Built-in defaults

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Top-level configuration. Every section has defaults so a partial file
/// (or no file at all) still yields a working configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub whisper: WhisperConfig,
    #[serde(default)]
    pub processing: ProcessingConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// The directories acting as pipeline state, plus the scratch area name.
#[derive(Debug, Clone, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_watch_folder")]
    pub watch_folder: PathBuf,
    #[serde(default = "default_processing_folder")]
    pub processing_folder: PathBuf,
    #[serde(default = "default_archive_folder")]
    pub archive_folder: PathBuf,
    #[serde(default = "default_failed_folder")]
    pub failed_folder: PathBuf,
    #[serde(default = "default_output_folder")]
    pub output_folder: PathBuf,

    /// Scratch subdirectory (under the processing folder) where the external
    /// command drops its output before it is read and deleted.
    #[serde(default = "default_whisper_temp")]
    pub whisper_temp_output: String,
}

fn default_watch_folder() -> PathBuf {
    PathBuf::from("watch")
}
fn default_processing_folder() -> PathBuf {
    PathBuf::from("processing")
}
fn default_archive_folder() -> PathBuf {
    PathBuf::from("archive")
}
fn default_failed_folder() -> PathBuf {
    PathBuf::from("failed")
}
fn default_output_folder() -> PathBuf {
    PathBuf::from("output")
}
fn default_whisper_temp() -> String {
    "whisper_temp".to_string()
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            watch_folder: default_watch_folder(),
            processing_folder: default_processing_folder(),
            archive_folder: default_archive_folder(),
            failed_folder: default_failed_folder(),
            output_folder: default_output_folder(),
            whisper_temp_output: default_whisper_temp(),
        }
    }
}

/// Parameters for the external transcription command.
#[derive(Debug, Clone, Deserialize)]
pub struct WhisperConfig {
    /// Launcher for the external environment. The built command line is
    /// appended as one final argument (default runs inside WSL).
    #[serde(default = "default_shell")]
    pub shell: Vec<String>,

    /// Name of the transcription binary inside the external environment.
    #[serde(default = "default_binary")]
    pub binary: String,

    /// Optional virtualenv to activate before invoking the binary.
    #[serde(default)]
    pub venv_path: Option<String>,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_language")]
    pub language: String,

    /// Output format flag; also determines the artifact file extension.
    #[serde(default = "default_output_format")]
    pub output_format: String,

    #[serde(default = "default_command_timeout")]
    pub command_timeout_seconds: u64,
}

fn default_shell() -> Vec<String> {
    vec![
        "wsl".to_string(),
        "-e".to_string(),
        "bash".to_string(),
        "-c".to_string(),
    ]
}
fn default_binary() -> String {
    "whisper".to_string()
}
fn default_model() -> String {
    "medium".to_string()
}
fn default_language() -> String {
    "en".to_string()
}
fn default_output_format() -> String {
    "txt".to_string()
}
fn default_command_timeout() -> u64 {
    600
}

impl Default for WhisperConfig {
    fn default() -> Self {
        Self {
            shell: default_shell(),
            binary: default_binary(),
            venv_path: None,
            model: default_model(),
            language: default_language(),
            output_format: default_output_format(),
            command_timeout_seconds: default_command_timeout(),
        }
    }
}

impl WhisperConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_seconds)
    }
}

/// Rules for which files enter the pipeline and when they may be touched.
#[derive(Debug, Clone, Deserialize)]
pub struct ProcessingConfig {
    /// Extension allow-set; entries may carry a leading dot.
    #[serde(default = "default_supported_formats")]
    pub supported_formats: Vec<String>,

    /// Settle delay before a newly observed file is touched, to tolerate
    /// writers that create-then-stream-write.
    #[serde(default = "default_file_write_wait")]
    pub file_write_wait_seconds: u64,

    /// Organize notes into output/<year>/<month>/ subfolders.
    #[serde(default = "default_true")]
    pub organize_by_date: bool,
}

fn default_supported_formats() -> Vec<String> {
    [".m4a", ".mp3", ".wav", ".ogg", ".flac"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
fn default_file_write_wait() -> u64 {
    2
}
fn default_true() -> bool {
    true
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            supported_formats: default_supported_formats(),
            file_write_wait_seconds: default_file_write_wait(),
            organize_by_date: default_true(),
        }
    }
}

impl ProcessingConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_secs(self.file_write_wait_seconds)
    }
}

/// Note formatting templates.
///
/// The same instant renders through three independent formats (frontmatter,
/// header, filename); that is intentional and each is configured separately.
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub date_organization: DateOrganization,

    #[serde(default = "default_filename_timestamp_format")]
    pub filename_timestamp_format: String,
    #[serde(default = "default_filename_prefix")]
    pub filename_prefix: String,
    #[serde(default = "default_filename_extension")]
    pub filename_extension: String,

    /// Replacement for the filename prefix on collision; `{counter}` is
    /// substituted with the duplicate counter.
    #[serde(default = "default_duplicate_counter_format")]
    pub duplicate_counter_format: String,

    #[serde(default = "default_frontmatter_datetime_format")]
    pub frontmatter_datetime_format: String,
    #[serde(default = "default_header_datetime_format")]
    pub header_datetime_format: String,
    #[serde(default = "default_header_prefix")]
    pub header_prefix: String,
    #[serde(default = "default_footer_text")]
    pub footer_text: String,
    #[serde(default = "default_tags")]
    pub default_tags: Vec<String>,
    #[serde(default = "default_command_type")]
    pub command_type: String,
}

/// Year/month folder name formats for date organization.
#[derive(Debug, Clone, Deserialize)]
pub struct DateOrganization {
    #[serde(default = "default_year_format")]
    pub year_format: String,
    #[serde(default = "default_month_format")]
    pub month_format: String,
}

fn default_year_format() -> String {
    "%Y".to_string()
}
fn default_month_format() -> String {
    "%m".to_string()
}

impl Default for DateOrganization {
    fn default() -> Self {
        Self {
            year_format: default_year_format(),
            month_format: default_month_format(),
        }
    }
}

fn default_filename_timestamp_format() -> String {
    "%Y-%m-%d_%H-%M-%S".to_string()
}
fn default_filename_prefix() -> String {
    "_voice_note".to_string()
}
fn default_filename_extension() -> String {
    ".md".to_string()
}
fn default_duplicate_counter_format() -> String {
    "_voice_note_{counter}".to_string()
}
fn default_frontmatter_datetime_format() -> String {
    "%Y-%m-%d %H:%M:%S".to_string()
}
fn default_header_datetime_format() -> String {
    "%Y-%m-%d %H:%M".to_string()
}
fn default_header_prefix() -> String {
    "# Voice Note ".to_string()
}
fn default_footer_text() -> String {
    "*Transcribed automatically*".to_string()
}
fn default_tags() -> Vec<String> {
    vec!["voice-note".to_string(), "transcription".to_string()]
}
fn default_command_type() -> String {
    "voice-note".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            date_organization: DateOrganization::default(),
            filename_timestamp_format: default_filename_timestamp_format(),
            filename_prefix: default_filename_prefix(),
            filename_extension: default_filename_extension(),
            duplicate_counter_format: default_duplicate_counter_format(),
            frontmatter_datetime_format: default_frontmatter_datetime_format(),
            header_datetime_format: default_header_datetime_format(),
            header_prefix: default_header_prefix(),
            footer_text: default_footer_text(),
            default_tags: default_tags(),
            command_type: default_command_type(),
        }
    }
}

/// Desktop notification settings. The pipeline works with delivery absent.
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_true")]
    pub on_success: bool,
    #[serde(default = "default_true")]
    pub on_failure: bool,

    #[serde(default = "default_app_name")]
    pub app_name: String,
    #[serde(default = "default_startup_title")]
    pub startup_title: String,
    #[serde(default = "default_success_title")]
    pub success_title: String,
    #[serde(default = "default_failure_title")]
    pub failure_title: String,

    #[serde(default = "default_short_duration")]
    pub startup_duration_secs: u64,
    #[serde(default = "default_short_duration")]
    pub success_duration_secs: u64,
    #[serde(default = "default_long_duration")]
    pub failure_duration_secs: u64,
}

fn default_app_name() -> String {
    "voicewatch".to_string()
}
fn default_startup_title() -> String {
    "Voice Watcher Started".to_string()
}
fn default_success_title() -> String {
    "Transcription Complete".to_string()
}
fn default_failure_title() -> String {
    "Transcription Failed".to_string()
}
fn default_short_duration() -> u64 {
    5
}
fn default_long_duration() -> u64 {
    10
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            on_success: default_true(),
            on_failure: default_true(),
            app_name: default_app_name(),
            startup_title: default_startup_title(),
            success_title: default_success_title(),
            failure_title: default_failure_title(),
            startup_duration_secs: default_short_duration(),
            success_duration_secs: default_short_duration(),
            failure_duration_secs: default_long_duration(),
        }
    }
}

/// Log sink settings. Console output is always on; `file` adds a file sink.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub file: Option<PathBuf>,
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: None,
            level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration, resolving the file per the discovery order.
    /// A missing file is only an error when it was named explicitly.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        if let Some(path) = Self::find_config_file() {
            return Self::from_file(&path);
        }

        Ok(Self::default())
    }

    /// Parse a config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Search the default locations for a config file.
    fn find_config_file() -> Option<PathBuf> {
        let local = PathBuf::from("voicewatch.yaml");
        if local.exists() {
            return Some(local);
        }

        let user = dirs::config_dir()?.join("voicewatch").join("config.yaml");
        if user.exists() {
            return Some(user);
        }

        None
    }

    /// Scratch directory for external-command output, under processing/.
    pub fn scratch_dir(&self) -> PathBuf {
        self.paths
            .processing_folder
            .join(&self.paths.whisper_temp_output)
    }
}
