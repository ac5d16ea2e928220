//! Notification polling and presentation configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Polling, popup, and toast settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Interval between full task polls, in seconds.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,
    /// Seconds before a shown popup dismisses itself.
    #[serde(default = "default_auto_dismiss")]
    pub auto_dismiss_seconds: u64,
    /// Maximum queued toasts; the oldest is dropped when full.
    #[serde(default = "default_toast_capacity")]
    pub toast_capacity: usize,
    /// Broadcast buffer for UI events.
    #[serde(default = "default_ui_buffer")]
    pub ui_event_buffer: usize,
    /// Identical toasts arriving within this window are shown once.
    #[serde(default = "default_dedup_window")]
    pub toast_dedup_window_ms: u64,
}

impl NotificationConfig {
    /// Poll interval as a [`Duration`].
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds)
    }

    /// Auto-dismiss timeout as a [`Duration`].
    pub fn auto_dismiss(&self) -> Duration {
        Duration::from_secs(self.auto_dismiss_seconds)
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            poll_interval_seconds: default_poll_interval(),
            auto_dismiss_seconds: default_auto_dismiss(),
            toast_capacity: default_toast_capacity(),
            ui_event_buffer: default_ui_buffer(),
            toast_dedup_window_ms: default_dedup_window(),
        }
    }
}

fn default_poll_interval() -> u64 {
    120
}

fn default_auto_dismiss() -> u64 {
    20
}

fn default_toast_capacity() -> usize {
    16
}

fn default_ui_buffer() -> usize {
    128
}

fn default_dedup_window() -> u64 {
    500
}
