//! Bounded queue of ephemeral toasts.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use claimdesk_core::types::TaskId;

use crate::message::types::NotificationKind;

/// A short-lived message announced to the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Toast {
    /// Sequence number, unique per queue.
    pub id: u64,
    /// Text to display.
    pub message: String,
    /// Severity.
    pub kind: NotificationKind,
    /// Related task.
    pub task_id: Option<TaskId>,
    /// When the toast was queued.
    pub created_at: DateTime<Utc>,
}

/// FIFO of recent toasts; the oldest is dropped when full.
#[derive(Debug)]
pub struct ToastQueue {
    items: VecDeque<Toast>,
    capacity: usize,
    next_id: u64,
}

impl ToastQueue {
    /// Create a queue holding up to `capacity` toasts.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
            next_id: 0,
        }
    }

    /// Queue a toast and return it.
    pub fn push(
        &mut self,
        message: impl Into<String>,
        kind: NotificationKind,
        task_id: Option<TaskId>,
    ) -> Toast {
        self.next_id += 1;
        let toast = Toast {
            id: self.next_id,
            message: message.into(),
            kind,
            task_id,
            created_at: Utc::now(),
        };

        if self.items.len() == self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(toast.clone());
        toast
    }

    /// Queued toasts, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Toast> {
        self.items.iter()
    }

    /// Number of queued toasts.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Drop every toast.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}
