//! External system integrations.
//!
//! - `whisper`: the transcription command runner
//! - `wsl`: native-to-WSL path translation for the command's environment
//! - `notifier`: desktop notification delivery

pub mod notifier;
pub mod whisper;
pub mod wsl;

pub use notifier::{DesktopNotifier, Notifications, NotificationError, Notifier, NoopNotifier};
pub use whisper::WhisperRunner;
pub use wsl::to_wsl_path;
