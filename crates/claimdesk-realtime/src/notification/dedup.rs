//! Suppression of identical toasts arriving in quick succession.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;

use claimdesk_core::types::TaskId;

use crate::message::types::NotificationKind;

/// Toast deduplicator: the same toast within `window` is shown once.
#[derive(Debug)]
pub struct ToastDeduplicator {
    window: Duration,
    last_seen: Mutex<HashMap<String, Instant>>,
}

impl ToastDeduplicator {
    /// Create a deduplicator with the given window.
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_seen: Mutex::new(HashMap::new()),
        }
    }

    /// Whether the toast should be shown (`false` for a duplicate).
    pub fn should_show(&self, key: &str) -> bool {
        if self.window.is_zero() {
            return true;
        }

        let mut map = self.last_seen.lock().unwrap_or_else(|e| e.into_inner());
        let now = Instant::now();

        if let Some(last) = map.get(key) {
            if now.duration_since(*last) < self.window {
                return false;
            }
        }

        // entries are kept for 10x the window
        let cutoff = self.window * 10;
        map.retain(|_, seen| now.duration_since(*seen) < cutoff);
        map.insert(key.to_string(), now);
        true
    }

    /// Build a dedup key from toast components.
    pub fn make_key(message: &str, kind: NotificationKind, task_id: Option<&TaskId>) -> String {
        let task = task_id.map(TaskId::as_str).unwrap_or("-");
        format!("{kind:?}:{task}:{message}")
    }
}
