//! Single-slot popup state machine.

use std::fmt;

use serde::{Deserialize, Serialize};

use claimdesk_core::types::TaskId;

/// Why a popup left the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseReason {
    /// The user closed it.
    Dismissed,
    /// The user opened the task.
    Viewed,
    /// The auto-dismiss timeout elapsed.
    Expired,
    /// The task was marked seen elsewhere while showing.
    Acknowledged,
    /// Logout or reset.
    Reset,
    /// The task vanished from the backend while showing.
    Withdrawn,
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Dismissed => "dismissed",
            Self::Viewed => "viewed",
            Self::Expired => "expired",
            Self::Acknowledged => "acknowledged",
            Self::Reset => "reset",
            Self::Withdrawn => "withdrawn",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Slot {
    Idle,
    Showing { task_id: TaskId, generation: u64 },
}

/// Holds at most one shown task.
///
/// Every show gets a new generation number so a timer armed for an earlier
/// popup can never close a later one.
#[derive(Debug)]
pub struct PresentationQueue {
    slot: Slot,
    generation: u64,
}

impl Default for PresentationQueue {
    fn default() -> Self {
        Self {
            slot: Slot::Idle,
            generation: 0,
        }
    }
}

impl PresentationQueue {
    /// Create an idle queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Task currently shown.
    pub fn current(&self) -> Option<&TaskId> {
        match &self.slot {
            Slot::Idle => None,
            Slot::Showing { task_id, .. } => Some(task_id),
        }
    }

    /// Whether a popup is on screen.
    pub fn is_showing(&self) -> bool {
        matches!(self.slot, Slot::Showing { .. })
    }

    /// Whether the popup on screen is the one from `generation`.
    pub fn is_current(&self, generation: u64) -> bool {
        matches!(&self.slot, Slot::Showing { generation: g, .. } if *g == generation)
    }

    /// Show `task_id` if idle. Returns the generation of the new popup.
    pub fn show(&mut self, task_id: TaskId) -> Option<u64> {
        if self.is_showing() {
            return None;
        }
        self.generation += 1;
        self.slot = Slot::Showing {
            task_id,
            generation: self.generation,
        };
        Some(self.generation)
    }

    /// Close whatever is showing.
    pub fn close(&mut self) -> Option<TaskId> {
        match std::mem::replace(&mut self.slot, Slot::Idle) {
            Slot::Idle => None,
            Slot::Showing { task_id, .. } => Some(task_id),
        }
    }

    /// Close the popup only if it is still the one from `generation`.
    pub fn close_generation(&mut self, generation: u64) -> Option<TaskId> {
        if self.is_current(generation) {
            self.close()
        } else {
            None
        }
    }

    /// Close the popup only if it shows `task_id`.
    pub fn close_task(&mut self, task_id: &TaskId) -> bool {
        if self.current() == Some(task_id) {
            self.close();
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_one_popup_at_a_time() {
        let mut queue = PresentationQueue::new();
        assert!(queue.show(TaskId::new("a")).is_some());
        assert!(queue.show(TaskId::new("b")).is_none());
        assert_eq!(queue.current(), Some(&TaskId::new("a")));
    }

    #[test]
    fn test_stale_generation_cannot_close() {
        let mut queue = PresentationQueue::new();
        let first = queue.show(TaskId::new("a")).unwrap();
        assert_eq!(queue.close(), Some(TaskId::new("a")));

        let second = queue.show(TaskId::new("b")).unwrap();
        assert_ne!(first, second);
        assert_eq!(queue.close_generation(first), None);
        assert!(queue.is_showing());
        assert_eq!(queue.close_generation(second), Some(TaskId::new("b")));
        assert!(!queue.is_showing());
    }

    #[test]
    fn test_close_task_matches_id() {
        let mut queue = PresentationQueue::new();
        queue.show(TaskId::new("a"));
        assert!(!queue.close_task(&TaskId::new("b")));
        assert!(queue.close_task(&TaskId::new("a")));
    }
}
