//! Merged view of every known task, grouped by ticket.

use std::collections::{BTreeMap, HashMap};

use tracing::trace;

use claimdesk_core::types::{TaskId, TicketId};
use claimdesk_entity::task::{Task, most_notification_worthy};

use super::seen::SeenRecord;

/// Latest known snapshot of each task, fed by polls and targeted refetches.
///
/// Snapshots of the same task are merged with [`Task::supersedes`]: the
/// newer `updated_at` wins, and when either side lacks one the later
/// arrival wins.
#[derive(Debug, Default)]
pub struct ReconciliationStore {
    by_ticket: BTreeMap<TicketId, Vec<Task>>,
    /// task id -> owning ticket
    index: HashMap<TaskId, TicketId>,
}

impl ReconciliationStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the task list of `ticket_id` with a fetched one.
    ///
    /// The fetched list decides which tasks belong to the ticket; for tasks
    /// already known, a stored snapshot that is newer than the fetched one
    /// is kept.
    pub fn replace_ticket_tasks(&mut self, ticket_id: &TicketId, fetched: Vec<Task>) {
        let previous = self.by_ticket.remove(ticket_id).unwrap_or_default();
        for task in &previous {
            self.index.remove(&task.id);
        }
        let mut previous: HashMap<TaskId, Task> =
            previous.into_iter().map(|task| (task.id.clone(), task)).collect();

        let mut merged = Vec::with_capacity(fetched.len());
        for task in fetched {
            if &task.ticket_id != ticket_id {
                trace!(task_id = %task.id, ticket_id = %ticket_id, "Skipping task listed under another ticket");
                continue;
            }
            let task = match previous.remove(&task.id) {
                Some(existing) if !task.supersedes(&existing) => existing,
                _ => task,
            };
            self.index.insert(task.id.clone(), ticket_id.clone());
            merged.push(task);
        }

        self.by_ticket.insert(ticket_id.clone(), merged);
    }

    /// Merge a single task snapshot. Returns whether the stored state changed.
    pub fn upsert_task(&mut self, task: Task) -> bool {
        let tasks = self.by_ticket.entry(task.ticket_id.clone()).or_default();
        match tasks.iter_mut().find(|existing| existing.id == task.id) {
            Some(existing) => {
                if !task.supersedes(existing) || *existing == task {
                    return false;
                }
                *existing = task;
            }
            None => {
                self.index.insert(task.id.clone(), task.ticket_id.clone());
                tasks.push(task);
            }
        }
        true
    }

    /// Keep only the given tickets, dropping the tasks of all others.
    pub fn retain_tickets(&mut self, ticket_ids: &[TicketId]) {
        let index = &mut self.index;
        self.by_ticket.retain(|ticket_id, tasks| {
            let keep = ticket_ids.contains(ticket_id);
            if !keep {
                for task in tasks.iter() {
                    index.remove(&task.id);
                }
            }
            keep
        });
    }

    /// Ticket owning `task_id`, if the task is known.
    pub fn ticket_of(&self, task_id: &TaskId) -> Option<&TicketId> {
        self.index.get(task_id)
    }

    /// Latest snapshot of `task_id`.
    pub fn get(&self, task_id: &TaskId) -> Option<&Task> {
        let ticket_id = self.index.get(task_id)?;
        self.by_ticket
            .get(ticket_id)?
            .iter()
            .find(|task| &task.id == task_id)
    }

    /// Tickets with a fetched task list.
    pub fn ticket_ids(&self) -> impl Iterator<Item = &TicketId> {
        self.by_ticket.keys()
    }

    /// Every known task.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.by_ticket.values().flatten()
    }

    /// Tasks not present in `seen`.
    pub fn unseen<'a>(&'a self, seen: &'a SeenRecord) -> impl Iterator<Item = &'a Task> + 'a {
        self.tasks().filter(move |task| !seen.contains(&task.id))
    }

    /// Number of tasks not present in `seen`.
    pub fn unseen_count(&self, seen: &SeenRecord) -> usize {
        self.unseen(seen).count()
    }

    /// The unseen task to surface first.
    pub fn most_notification_worthy_unseen<'a>(&'a self, seen: &'a SeenRecord) -> Option<&'a Task> {
        most_notification_worthy(self.unseen(seen))
    }

    /// Number of known tasks.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether no task is known.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Forget everything.
    pub fn clear(&mut self) {
        self.by_ticket.clear();
        self.index.clear();
    }
}
