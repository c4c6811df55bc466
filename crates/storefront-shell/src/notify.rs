//! # Notification Surface
//!
//! Fire-and-forget user messages. The shell raises them; how they look is
//! up to whoever implements [`Notifier`].
//!
//! ## Messages Raised by the Shell
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Trigger                                   Level     Message            │
//! │  ───────                                   ─────     ───────            │
//! │  Private route, viewer anonymous           Info      sign-in prompt     │
//! │  Sign-out while on a Private route         Info      session ended      │
//! │  Region failed to load                     Warning   retry hint         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

pub const SIGN_IN_REQUIRED: &str = "Please sign in to continue";
pub const SESSION_ENDED: &str = "Your session has ended";

// =============================================================================
// Presentation Settings
// =============================================================================

/// Where toasts stack on screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToastPosition {
    #[default]
    TopRight,
    TopCenter,
    TopLeft,
    BottomRight,
    BottomCenter,
    BottomLeft,
}

impl fmt::Display for ToastPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ToastPosition::TopRight => "top-right",
            ToastPosition::TopCenter => "top-center",
            ToastPosition::TopLeft => "top-left",
            ToastPosition::BottomRight => "bottom-right",
            ToastPosition::BottomCenter => "bottom-center",
            ToastPosition::BottomLeft => "bottom-left",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for ToastPosition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "top-right" => Ok(ToastPosition::TopRight),
            "top-center" => Ok(ToastPosition::TopCenter),
            "top-left" => Ok(ToastPosition::TopLeft),
            "bottom-right" => Ok(ToastPosition::BottomRight),
            "bottom-center" => Ok(ToastPosition::BottomCenter),
            "bottom-left" => Ok(ToastPosition::BottomLeft),
            other => Err(format!("unknown toast position '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastTheme {
    #[default]
    Light,
    Dark,
    Colored,
}

/// Presentation settings for the notification surface.
///
/// Purely presentational; the shell only reads `newest_on_top` when ordering
/// recorded messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub position: ToastPosition,
    pub auto_close_ms: u64,
    pub hide_progress_bar: bool,
    pub newest_on_top: bool,
    pub close_on_click: bool,
    pub rtl: bool,
    pub pause_on_focus_loss: bool,
    pub draggable: bool,
    pub pause_on_hover: bool,
    pub theme: ToastTheme,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        NotificationConfig {
            position: ToastPosition::TopRight,
            auto_close_ms: 5000,
            hide_progress_bar: false,
            newest_on_top: true,
            close_on_click: true,
            rtl: false,
            pause_on_focus_loss: true,
            draggable: true,
            pause_on_hover: true,
            theme: ToastTheme::Light,
        }
    }
}

// =============================================================================
// Notifications
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub level: Level,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Notification {
            level,
            message: message.into(),
            created_at: Utc::now(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Level::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Level::Warning, message)
    }
}

/// Receives user-facing messages. Must not block.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Writes notifications to the log.
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            Level::Info | Level::Success => info!(message = %notification.message, "Notification"),
            Level::Warning => warn!(message = %notification.message, "Notification"),
            Level::Error => error!(message = %notification.message, "Notification"),
        }
    }
}

/// Keeps notifications in memory, ordered per `newest_on_top`.
#[derive(Debug, Clone, Default)]
pub struct MemoryNotifier {
    newest_on_top: bool,
    entries: Arc<Mutex<Vec<Notification>>>,
}

impl MemoryNotifier {
    pub fn new(config: &NotificationConfig) -> Self {
        MemoryNotifier {
            newest_on_top: config.newest_on_top,
            entries: Arc::default(),
        }
    }

    /// Recorded notifications in display order.
    pub fn entries(&self) -> Vec<Notification> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.entries().into_iter().map(|n| n.message).collect()
    }

    /// Removes and returns everything recorded so far.
    pub fn drain(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.entries.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, notification: Notification) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if self.newest_on_top {
            entries.insert(0, notification);
        } else {
            entries.push(notification);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_presentation() {
        let config = NotificationConfig::default();
        assert_eq!(config.position, ToastPosition::TopRight);
        assert_eq!(config.auto_close_ms, 5000);
        assert!(config.newest_on_top);
        assert!(!config.rtl);
        assert_eq!(config.theme, ToastTheme::Light);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: NotificationConfig =
            toml::from_str("position = \"bottom-left\"\nauto_close_ms = 2000").unwrap();
        assert_eq!(config.position, ToastPosition::BottomLeft);
        assert_eq!(config.auto_close_ms, 2000);
        assert!(config.pause_on_hover);
    }

    #[test]
    fn test_position_round_trips_through_text() {
        for position in [ToastPosition::TopCenter, ToastPosition::BottomRight] {
            assert_eq!(position.to_string().parse::<ToastPosition>().unwrap(), position);
        }
        assert!("middle".parse::<ToastPosition>().is_err());
    }

    #[test]
    fn test_memory_notifier_ordering() {
        let newest_first = MemoryNotifier::new(&NotificationConfig::default());
        newest_first.notify(Notification::info("first"));
        newest_first.notify(Notification::warning("second"));
        assert_eq!(newest_first.messages(), vec!["second", "first"]);

        let oldest_first = MemoryNotifier::new(&NotificationConfig {
            newest_on_top: false,
            ..NotificationConfig::default()
        });
        oldest_first.notify(Notification::info("first"));
        oldest_first.notify(Notification::info("second"));
        assert_eq!(oldest_first.messages(), vec!["first", "second"]);

        assert_eq!(oldest_first.drain().len(), 2);
        assert!(oldest_first.entries().is_empty());
    }
}
