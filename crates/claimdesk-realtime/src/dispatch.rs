//! Routes decoded server events to cache invalidations and toasts.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use claimdesk_core::types::{TaskId, TicketId};

use crate::invalidation::{Invalidation, InvalidationBus};
use crate::message::types::{NotificationKind, ServerEvent};
use crate::notification::center::NotificationCenter;

/// Turns push events into invalidation signals and toasts. Events never
/// modify task data directly; the poller refetches on invalidation.
#[derive(Debug, Clone)]
pub struct EventDispatcher {
    center: Arc<NotificationCenter>,
    bus: InvalidationBus,
}

impl EventDispatcher {
    /// Create a dispatcher.
    pub fn new(center: Arc<NotificationCenter>, bus: InvalidationBus) -> Self {
        Self { center, bus }
    }

    /// Handle one event.
    pub fn dispatch(&self, event: ServerEvent) {
        trace!(kind = event.kind_name(), "Dispatching realtime event");

        match event {
            ServerEvent::Notification {
                message,
                notification_type,
                task_id,
            } => {
                if let Some(task_id) = &task_id {
                    self.invalidate_tasks(None, Some(task_id));
                }
                self.center.push_toast(message, notification_type, task_id);
            }
            ServerEvent::TaskUpdate {
                message,
                task_id,
                ticket_id,
            } => {
                self.invalidate_tasks(ticket_id.as_ref(), task_id.as_ref());
                if let Some(message) = message {
                    self.center.push_toast(message, NotificationKind::Info, task_id);
                }
            }
            ServerEvent::TicketUpdate {
                message,
                task_id,
                ticket_id,
            } => {
                self.invalidate(Invalidation::TicketList);
                if let Some(ticket_id) = ticket_id {
                    self.invalidate(Invalidation::TicketTasks(ticket_id));
                }
                if let Some(message) = message {
                    self.center.push_toast(message, NotificationKind::Info, task_id);
                }
            }
            ServerEvent::TicketsUpdate => self.invalidate(Invalidation::TicketList),
            ServerEvent::Unknown => debug!("Ignoring unknown realtime event"),
        }
    }

    /// Invalidate the task list of the ticket owning the change. When the
    /// owner cannot be resolved, the whole ticket list is refetched.
    fn invalidate_tasks(&self, ticket_id: Option<&TicketId>, task_id: Option<&TaskId>) {
        let owner = ticket_id
            .cloned()
            .or_else(|| task_id.and_then(|id| self.center.ticket_of(id)));

        match owner {
            Some(ticket_id) => self.invalidate(Invalidation::TicketTasks(ticket_id)),
            None => {
                debug!(task_id = ?task_id, "Owning ticket unknown, refreshing all tickets");
                self.invalidate(Invalidation::TicketList);
            }
        }
    }

    fn invalidate(&self, invalidation: Invalidation) {
        self.center.announce_invalidation(invalidation.clone());
        self.bus.publish(invalidation);
    }

    /// Dispatch events until the channel closes or `cancel` fires.
    pub async fn run(self, mut events: mpsc::Receiver<ServerEvent>, cancel: CancellationToken) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                event = events.recv() => match event {
                    Some(event) => self.dispatch(event),
                    None => break,
                },
            }
        }
        debug!("Event dispatcher stopped");
    }
}
