//! Desktop notification boundary.
//!
//! The pipeline emits structured [`NotificationEvent`]s; whether anything
//! renders them is this adapter's concern. Delivery failure is logged at warn
//! and never affects pipeline state, and the pipeline functions identically
//! with the collaborator entirely absent (the no-op notifier).

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::NotificationsConfig;
use crate::domain::{NotificationEvent, NotificationKind};

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("failed to send notification: {0}")]
    SendFailed(String),
}

/// Delivery seam for notification events.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, event: &NotificationEvent) -> Result<(), NotificationError>;
}

/// Swallows every event. Used when notifications are disabled.
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn notify(&self, _event: &NotificationEvent) -> Result<(), NotificationError> {
        Ok(())
    }
}

/// Desktop notifier backed by notify-rust.
pub struct DesktopNotifier {
    app_name: String,
}

impl DesktopNotifier {
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
        }
    }
}

#[async_trait]
impl Notifier for DesktopNotifier {
    async fn notify(&self, event: &NotificationEvent) -> Result<(), NotificationError> {
        let app_name = self.app_name.clone();
        let title = event.title.clone();
        let message = event.message.clone();
        let timeout_ms = event.duration.as_millis().min(u32::MAX as u128) as u32;

        // notify-rust can block on the session bus; keep it off the runtime.
        tokio::task::spawn_blocking(move || {
            notify_rust::Notification::new()
                .appname(&app_name)
                .summary(&title)
                .body(&message)
                .timeout(notify_rust::Timeout::Milliseconds(timeout_ms))
                .show()
                .map(|_| ())
                .map_err(|e| NotificationError::SendFailed(e.to_string()))
        })
        .await
        .map_err(|e| NotificationError::SendFailed(format!("task join error: {}", e)))?
    }
}

/// Emit-side wrapper: builds events from config templates, applies the
/// per-kind gates, and absorbs delivery failures.
pub struct Notifications {
    config: NotificationsConfig,
    notifier: Box<dyn Notifier>,
}

impl Notifications {
    pub fn from_config(config: NotificationsConfig) -> Self {
        let notifier: Box<dyn Notifier> = if config.enabled {
            Box::new(DesktopNotifier::new(config.app_name.clone()))
        } else {
            Box::new(NoopNotifier)
        };

        Self { config, notifier }
    }

    /// Use a specific delivery backend (tests, headless deployments).
    pub fn with_notifier(config: NotificationsConfig, notifier: Box<dyn Notifier>) -> Self {
        Self { config, notifier }
    }

    pub async fn startup(&self, watch_folder: &Path) {
        if !self.config.enabled {
            return;
        }

        self.send(NotificationEvent {
            kind: NotificationKind::Startup,
            title: self.config.startup_title.clone(),
            message: format!("Monitoring: {}", watch_folder.display()),
            duration: Duration::from_secs(self.config.startup_duration_secs),
        })
        .await;
    }

    pub async fn success(&self, file_name: &str, elapsed: Duration) {
        if !self.config.enabled || !self.config.on_success {
            return;
        }

        self.send(NotificationEvent {
            kind: NotificationKind::Success,
            title: self.config.success_title.clone(),
            message: format!(
                "{}\nProcessed in {:.1} seconds",
                file_name,
                elapsed.as_secs_f64()
            ),
            duration: Duration::from_secs(self.config.success_duration_secs),
        })
        .await;
    }

    pub async fn failure(&self, file_name: &str, error: &str) {
        if !self.config.enabled || !self.config.on_failure {
            return;
        }

        let summary: String = error.chars().take(100).collect();
        self.send(NotificationEvent {
            kind: NotificationKind::Failure,
            title: self.config.failure_title.clone(),
            message: format!("{}\n{}", file_name, summary),
            duration: Duration::from_secs(self.config.failure_duration_secs),
        })
        .await;
    }

    async fn send(&self, event: NotificationEvent) {
        if let Err(e) = self.notifier.notify(&event).await {
            tracing::warn!("Notification failed: {}", e);
        }
    }
}
