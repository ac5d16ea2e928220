//! Cache invalidation signals.
//!
//! Push events never carry data; they only tell consumers which cached
//! lists are stale. Consumers refetch on their own schedule.

use std::fmt;

use tokio::sync::broadcast;
use tracing::trace;

use claimdesk_core::types::TicketId;

/// A cached list that must be refetched.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Invalidation {
    /// The current user's ticket list.
    TicketList,
    /// The task list of one ticket.
    TicketTasks(TicketId),
    /// Everything (used after reconnects and identity changes).
    All,
}

impl fmt::Display for Invalidation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TicketList => write!(f, "tickets"),
            Self::TicketTasks(id) => write!(f, "tickets/{id}/tasks"),
            Self::All => write!(f, "*"),
        }
    }
}

/// Broadcast bus for invalidation signals.
#[derive(Debug, Clone)]
pub struct InvalidationBus {
    sender: broadcast::Sender<Invalidation>,
}

impl InvalidationBus {
    /// Create a bus buffering up to `capacity` signals per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publish a signal. Having no subscribers is not an error.
    pub fn publish(&self, invalidation: Invalidation) {
        trace!(key = %invalidation, "Cache invalidated");
        let _ = self.sender.send(invalidation);
    }

    /// Subscribe to future signals.
    pub fn subscribe(&self) -> broadcast::Receiver<Invalidation> {
        self.sender.subscribe()
    }
}
