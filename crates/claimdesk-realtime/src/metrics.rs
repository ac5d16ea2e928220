//! Realtime client counters.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Counters shared by the channel, dispatcher and notification center.
#[derive(Debug, Default)]
pub struct RealtimeMetrics {
    /// Successful socket opens
    pub connects: AtomicU64,
    /// Reconnects scheduled after a close or failed connect
    pub reconnects: AtomicU64,
    /// Text frames received
    pub messages_received: AtomicU64,
    /// Frames dropped because they failed validation or decoding
    pub malformed_messages: AtomicU64,
    /// Toasts announced to the UI
    pub toasts_shown: AtomicU64,
    /// Toasts suppressed as duplicates
    pub toasts_deduplicated: AtomicU64,
}

impl RealtimeMetrics {
    /// Create zeroed metrics
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_connect(&self) {
        self.connects.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_reconnect(&self) {
        self.reconnects.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_message(&self) {
        self.messages_received.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_malformed(&self) {
        self.malformed_messages.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_toast(&self, shown: bool) {
        if shown {
            self.toasts_shown.fetch_add(1, Ordering::Relaxed);
        } else {
            self.toasts_deduplicated.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Get a snapshot of all counters
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            connects: self.connects.load(Ordering::Relaxed),
            reconnects: self.reconnects.load(Ordering::Relaxed),
            messages_received: self.messages_received.load(Ordering::Relaxed),
            malformed_messages: self.malformed_messages.load(Ordering::Relaxed),
            toasts_shown: self.toasts_shown.load(Ordering::Relaxed),
            toasts_deduplicated: self.toasts_deduplicated.load(Ordering::Relaxed),
        }
    }
}

/// Serializable metrics snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Successful socket opens
    pub connects: u64,
    /// Reconnects scheduled
    pub reconnects: u64,
    /// Text frames received
    pub messages_received: u64,
    /// Frames dropped as malformed
    pub malformed_messages: u64,
    /// Toasts announced
    pub toasts_shown: u64,
    /// Toasts suppressed as duplicates
    pub toasts_deduplicated: u64,
}
